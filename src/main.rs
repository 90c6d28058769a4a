// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 异步文件服务器
//!
//! 该模块实现了基于 Tokio 运行时的多线程文件服务器传输层。
//! 核心功能包括：
//! - 基于规则链的请求分发引擎（路径解析 → 规则匹配 → 动作执行）
//! - 支持多线程异步 I/O 处理
//! - 动态脚本解释器探测
//! - 外部脚本执行（标准输出作为响应体）
//! - 后台管理控制台（CLI 指令交互）

#![allow(clippy::unused_io_amount)]

// --- 模块定义 ---
mod config;     // 配置解析与管理
mod dispatch;   // 请求协调器
mod exception;  // 自定义异常与错误处理
mod param;      // 全局常量与静态参数
mod request;    // HTTP 请求报文解析器
mod response;   // HTTP 响应报文构建器
mod rules;      // 规则链与规则定义
mod util;       // 文件读取、目录列表、脚本执行与页面渲染

use config::Config;
use dispatch::RequestCoordinator;
use exception::Exception;
use request::Request;

use log::{debug, error, info, warn};
use log4rs;
use regex::Regex;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    process::Command,
    sync::{Arc, Mutex},
    time::Instant,
};

/// # 程序入口点
///
/// 初始化系统环境、加载配置、探测外部依赖并启动主事件循环。
fn main() {
    // 1. 初始化日志系统：采用 log4rs 异步日志架构，通过外部 YAML 灵活配置级别与输出目的地
    log4rs::init_file("config/log4rs.yaml", Default::default()).unwrap();

    // 2. 环境配置加载：从 TOML 文件读取运行参数
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");
    info!("服务根目录: {}", config.root());

    // 3. 外部依赖探测：自动检查系统环境中的脚本解释器版本
    probe_interpreter(config.script_interpreter());

    // 4. 异步运行时定制：根据配置文件动态分配工作线程数
    let worker_threads = config.worker_threads();
    let runtime = Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(serve(config));
}

/// 探测配置的脚本解释器是否可用，并在日志中记录其版本号。
///
/// 找不到解释器时服务器照常启动，只是脚本目标会在请求时失败。
fn probe_interpreter(interpreter: &str) {
    let probe = Command::new(interpreter).arg("--version").output();
    match probe {
        Ok(o) if o.status.success() => {
            let output = String::from_utf8_lossy(&o.stdout);
            // 使用正则表达式精准提取版本号
            let re = Regex::new(r"(\d+\.\d+\.\d+)").unwrap();
            if let Some(capture) = re.captures(&output) {
                if let Some(version) = capture.get(1) {
                    info!("找到脚本解释器{}，版本：{}", interpreter, version.as_str());
                }
            }
        }
        _ => {
            warn!(
                "无法找到脚本解释器{}。服务器将继续运行，但将无法处理脚本请求。",
                interpreter
            );
        }
    }
}

/// # 主事件循环
///
/// 绑定监听端口，持续接收新连接并将其分发至 Tokio 线程池进行异步处理。
async fn serve(config: Config) {
    // 1. 进程级只读状态：规则链与链级配置在此构造一次，之后只读共享
    let coordinator = Arc::new(RequestCoordinator::from_config(&config));

    // 2. 网络层初始化：
    // 支持全地址监听 (0.0.0.0) 或本地回环监听 (127.0.0.1)
    let port: u16 = config.port();
    info!("服务端将在{}端口上监听Socket连接", port);
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}地址上监听Socket连接", address);
    let socket = SocketAddrV4::new(address, port);

    // 绑定端口并启动监听器
    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            panic!("无法绑定端口：{}，错误：{}", port, e);
        }
    };
    info!("端口{}绑定完成", port);

    // 3. 服务器状态与生命周期管理
    // shutdown_flag: 用于优雅停机 (Graceful Shutdown)
    // active_connection: 原子追踪当前并发连接数
    let shutdown_flag = Arc::new(Mutex::new(false));
    let active_connection = Arc::new(Mutex::new(0u32));

    // 4. 启动交互式管理控制台任务
    // 该任务运行在后台，不阻塞监听循环，提供运维指令支持
    tokio::spawn({
        let shutdown_flag = Arc::clone(&shutdown_flag);
        let active_connection = Arc::clone(&active_connection);
        async move {
            let stdin = tokio::io::stdin();
            let mut reader = BufReader::new(stdin);
            let mut input = String::new();
            loop {
                input.clear();
                if let Ok(_) = reader.read_line(&mut input).await {
                    let cmd = input.trim();
                    match cmd {
                        "stop" => {
                            let mut flag = shutdown_flag.lock().unwrap();
                            *flag = true;
                            println!("停机指令已激活，服务器将在处理完下一个请求后关闭...");
                            break;
                        }
                        "help" => {
                            println!("== Fileserver Help ==");
                            println!("stop   - 发出停机信号");
                            println!("status - 查看当前服务器运行状态");
                            println!("help   - 显示此帮助信息");
                            println!("=====================");
                        }
                        "status" => {
                            let active_count = *active_connection.lock().unwrap();
                            println!("== Fileserver 状态 ==");
                            println!("当前活跃连接数: {}", active_count);
                            println!("=====================");
                        }
                        _ => {
                            println!("无效的命令：{}", cmd);
                        }
                    }
                } else {
                    break;
                }
            }
        }
    });

    let mut id: u128 = 0;

    // 5. 主事件循环 (Accept Loop)
    loop {
        // 检查停机标志位
        if *shutdown_flag.lock().unwrap() {
            info!("主循环接收到停机指令，正在退出...");
            break;
        }

        // 等待新的 TCP 连接
        let (mut stream, addr) = listener.accept().await.unwrap();
        debug!("新的连接：{}", addr);

        // 为每个连接克隆资源句柄（Arc 引用计数增加）
        let active_connection_arc = Arc::clone(&active_connection);
        let coordinator_arc = Arc::clone(&coordinator);

        debug!("[ID{}]TCP连接已建立", id);

        // 使用轻量级绿色线程处理具体请求，确保非阻塞 IO
        tokio::spawn(async move {
            {
                // 连接计数加 1
                let mut lock = active_connection_arc.lock().unwrap();
                *lock += 1;
            }

            // 核心业务处理
            handle_connection(&mut stream, addr, id, coordinator_arc).await;

            {
                // 处理完成后连接计数减 1
                let mut lock = active_connection_arc.lock().unwrap();
                *lock -= 1;
            }
        });
        id += 1; // 增加请求唯一标识序列
    }
}

/// # 连接处理器
///
/// 负责单个 TCP 流的生命周期，包括读取解析请求、驱动规则链分发、
/// 以及发送构建好的响应。
async fn handle_connection(
    stream: &mut TcpStream,
    peer: SocketAddr,
    id: u128,
    coordinator: Arc<RequestCoordinator>,
) {
    let mut buffer = vec![0; 1024];

    // 等待流进入可读状态
    stream.readable().await.unwrap();

    // 尝试非阻塞读取 HTTP 报文
    match stream.try_read(&mut buffer) {
        Ok(0) => return, // 客户端主动关闭连接
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
        _ => {}
    }
    debug!("[ID{}]HTTP请求接收完毕", id);

    let start_time = Instant::now();

    // 1. 协议解析阶段：将字节流转换为结构化的 Request 对象
    let request = match Request::try_from(&buffer, peer, id) {
        Ok(req) => req,
        Err(Exception::UnSupportedRequestMethod) => {
            // 非 GET 方法在传输层即被拒绝，不进入规则链
            warn!("[ID{}]非GET方法的HTTP请求，返回405", id);
            let response =
                "HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 18\r\n\r\nMethod Not Allowed";
            let _ = stream.write_all(response.as_bytes()).await;
            return;
        }
        Err(e) => {
            error!("[ID{}]解析HTTP请求失败: {:?}", id, e);
            let response = "HTTP/1.1 400 Bad Request\r\nContent-Length: 11\r\n\r\nBad Request";
            let _ = stream.write_all(response.as_bytes()).await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    // 2. 分发阶段：解析目标路径，驱动规则链，构建 Response 对象。
    // 协调器保证任何失败都已转换为 404 错误页。
    let response = coordinator.handle(&request, id);

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    // 3. 结构化日志记录：便于后期审计与性能监控
    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}, ",
        id,
        request.version(),
        request.path(),
        request.method(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    // 4. 数据发送阶段：整段响应一次写出
    let response_bytes = response.as_bytes();
    debug!("[ID{}]发送全量响应，长度: {}", id, response_bytes.len());
    let _ = stream.write_all(&response_bytes).await;
    let _ = stream.flush().await;
}
