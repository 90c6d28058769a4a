use std::{fs, path::Path, process::Command};

use bytes::Bytes;
use log::{debug, error};

use crate::{
    exception::Exception,
    param::{ERROR_PAGE, HIDDEN_PREFIX, LISTING_PAGE},
};

/// 读取目标文件的全部字节。要么完整读出，要么返回异常，不暴露部分读取。
///
/// `request_path` 是客户端最初请求的路径，异常描述中嵌入的是它而非物理路径。
pub fn read_file_bytes(path: &Path, request_path: &str) -> Result<Bytes, Exception> {
    match fs::read(path) {
        Ok(contents) => Ok(Bytes::from(contents)),
        Err(e) => Err(Exception::UnreadableFile {
            path: request_path.to_string(),
            cause: e.to_string(),
        }),
    }
}

/// 枚举目录的直接子项，过滤掉以 `.` 开头的隐藏项。
///
/// 条目顺序就是文件系统枚举返回的顺序，不做排序。
pub fn list_visible_entries(path: &Path, request_path: &str) -> Result<Vec<String>, Exception> {
    let read_dir = match fs::read_dir(path) {
        Ok(rd) => rd,
        Err(e) => {
            return Err(Exception::UnlistableDirectory {
                path: request_path.to_string(),
                cause: e.to_string(),
            })
        }
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(en) => en,
            Err(e) => {
                return Err(Exception::UnlistableDirectory {
                    path: request_path.to_string(),
                    cause: e.to_string(),
                })
            }
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(HIDDEN_PREFIX) {
            continue;
        }
        entries.push(name);
    }
    Ok(entries)
}

/// 调用外部解释器执行脚本，阻塞等待其退出，捕获完整的标准输出作为响应体。
///
/// 没有超时，也不限制输出大小。挂起的脚本会无限期阻塞当前请求。
pub fn execute_script(
    interpreter: &str,
    path: &Path,
    request_path: &str,
    id: u128,
) -> Result<Bytes, Exception> {
    let result = Command::new(interpreter)
        .arg(path) // 脚本文件路径是唯一参数
        .output();
    let output = match result {
        Ok(o) => o,
        Err(e) => {
            return Err(Exception::ScriptExecutionFailure {
                path: request_path.to_string(),
                cause: e.to_string(),
            })
        }
    };

    if output.status.success() {
        debug!("[ID{}]脚本执行成功，输出{}字节", id, output.stdout.len());
        Ok(Bytes::from(output.stdout))
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("[ID{}]解释器出错：{}", id, stderr);
        Err(Exception::ScriptExecutionFailure {
            path: request_path.to_string(),
            cause: output.status.to_string(),
        })
    }
}

/// 将请求路径与异常描述渲染为固定模板的 HTML 错误页。纯格式化，不会失败。
pub fn render_error_page(path: &str, msg: &str) -> String {
    ERROR_PAGE.replace("{path}", path).replace("{msg}", msg)
}

/// 将目录子项渲染为 `<li>` 块并嵌入列表页模板。
pub fn render_listing_page(path: &str, entries: &[String]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|name| format!("<li>{}</li>", name))
        .collect();
    LISTING_PAGE
        .replace("{path}", path)
        .replace("{entries}", &items.join("\n"))
}
