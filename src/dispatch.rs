// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求协调器模块
//!
//! 协调器把一次请求从路径解析驱动到响应构建：
//! 1. 把请求路径拼接到服务根目录之后，得到目标路径（每个请求解析一次）。
//! 2. 按序求值规则链，执行首个命中规则的动作。
//! 3. 把动作抛出的任何异常在此边界捕获恰好一次，统一转换为 404 错误页。
//!
//! 规则链与链级配置在启动时构造完毕，之后只读，协调器本身可以被
//! 任意数量的并发请求共享（通常包在 `Arc` 中）。单个请求的失败
//! 是请求级别的，不会影响链状态或后续请求。

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::{
    config::Config,
    request::Request,
    response::Response,
    rules::{ChainSettings, DispatchContext, RuleChain},
};

/// 进程级的请求协调器。构造一次，只读共享。
pub struct RequestCoordinator {
    root: PathBuf,
    settings: ChainSettings,
    chain: RuleChain,
}

impl RequestCoordinator {
    pub fn new(root: &str, settings: ChainSettings) -> Self {
        Self {
            root: PathBuf::from(root),
            settings,
            chain: RuleChain::standard(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.root(), ChainSettings::from_config(config))
    }

    /// 把请求路径解析为文件系统目标：去掉领先的 `/` 后直接拼在根目录后面。
    ///
    /// 不做任何规范化。`..` 段原样保留，可以指到根目录之外，
    /// 这是沿袭原始行为的刻意选择（见 DESIGN.md）。
    pub fn resolve(&self, request_path: &str) -> PathBuf {
        let relative = request_path.strip_prefix('/').unwrap_or(request_path);
        self.root.join(relative)
    }

    /// 处理一次请求，总是恰好产出一个响应。
    pub fn handle(&self, request: &Request, id: u128) -> Response {
        let target = self.resolve(request.path());
        debug!("[ID{}]映射物理路径：{}", id, target.display());

        let ctx = DispatchContext {
            target: &target,
            request_path: request.path(),
            settings: &self.settings,
            id,
        };

        match self.chain.dispatch(&ctx) {
            Ok(content) => Response::from_content(content),
            Err(e) => {
                warn!("[ID{}]请求的路径：{} 处理失败：{}", id, request.path(), e);
                Response::from_exception(request.path(), &e)
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ChainSettings;
    use std::fs::{self, File};
    use std::io::Write;
    use std::net::SocketAddr;
    use tempfile::TempDir;

    fn coordinator(dir: &TempDir) -> RequestCoordinator {
        RequestCoordinator::new(
            dir.path().to_str().unwrap(),
            ChainSettings::new("index.html", ".sh", "sh"),
        )
    }

    fn get(path: &str) -> Request {
        let raw = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path);
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        Request::try_from(raw.as_bytes(), peer, 0).unwrap()
    }

    /// 从配置构造的协调器采用配置的根目录与链级参数
    #[test]
    fn test_from_config_uses_configured_root() {
        let coord = RequestCoordinator::from_config(&crate::config::Config::new());

        assert_eq!(coord.root(), std::path::Path::new("."));
        // 默认配置下 index.html 作为索引文件参与解析
        let target = coord.resolve("/docs");
        assert_eq!(target, std::path::PathBuf::from("./docs"));
    }

    #[test]
    fn test_serve_regular_file() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.html"))
            .unwrap()
            .write_all(b"<p>hi</p>")
            .unwrap();

        let response = coordinator(&dir).handle(&get("/a.html"), 0);

        assert_eq!(response.status_code(), 200);
        assert_eq!(&response.content()[..], b"<p>hi</p>");
        assert_eq!(response.content_length(), 9);
    }

    #[test]
    fn test_missing_target_is_404_with_path_in_body() {
        let dir = TempDir::new().unwrap();

        let response = coordinator(&dir).handle(&get("/missing.txt"), 0);

        assert_eq!(response.status_code(), 404);
        let body = String::from_utf8(response.content().to_vec()).unwrap();
        assert!(body.contains("'/missing.txt' not found"));
    }

    #[test]
    fn test_empty_directory_listing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();

        let response = coordinator(&dir).handle(&get("/docs"), 0);

        assert_eq!(response.status_code(), 200);
        let body = String::from_utf8(response.content().to_vec()).unwrap();
        assert!(body.contains("Listing for /docs"));
        assert!(!body.contains("<li>"));
    }

    #[test]
    fn test_root_path_resolves_to_root_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let response = coordinator(&dir).handle(&get("/"), 0);

        // 根目录没有索引文件时渲染列表页
        assert_eq!(response.status_code(), 200);
        let body = String::from_utf8(response.content().to_vec()).unwrap();
        assert!(body.contains("<li>sub</li>"));
    }

    #[test]
    fn test_directory_with_index_equals_serving_index() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("site")).unwrap();
        File::create(dir.path().join("site/index.html"))
            .unwrap()
            .write_all(b"<h1>home</h1>")
            .unwrap();
        let coord = coordinator(&dir);

        let via_dir = coord.handle(&get("/site"), 0);
        let via_file = coord.handle(&get("/site/index.html"), 1);

        assert_eq!(via_dir.status_code(), 200);
        assert_eq!(via_dir.content(), via_file.content());
    }

    #[test]
    fn test_script_output_is_response_body() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("gen.sh"))
            .unwrap()
            .write_all(b"printf '<b>out</b>'")
            .unwrap();

        let response = coordinator(&dir).handle(&get("/gen.sh"), 0);

        assert_eq!(response.status_code(), 200);
        assert_eq!(&response.content()[..], b"<b>out</b>");
    }

    #[test]
    fn test_failing_script_is_404_cannot_be_executed() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("bad.sh"))
            .unwrap()
            .write_all(b"exit 1")
            .unwrap();

        let response = coordinator(&dir).handle(&get("/bad.sh"), 0);

        assert_eq!(response.status_code(), 404);
        let body = String::from_utf8(response.content().to_vec()).unwrap();
        assert!(body.contains("cannot be executed"));
    }

    /// 同一请求重复处理，响应逐字节一致（Date 头除外，故只比较正文与状态）
    #[test]
    fn test_handle_is_idempotent() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.html"))
            .unwrap()
            .write_all(b"<p>hi</p>")
            .unwrap();
        let coord = coordinator(&dir);

        let first = coord.handle(&get("/a.html"), 0);
        let second = coord.handle(&get("/a.html"), 1);

        assert_eq!(first.status_code(), second.status_code());
        assert_eq!(first.content(), second.content());
    }

    /// 失败是请求级别的：一次 404 不影响后续请求
    #[test]
    fn test_failure_does_not_affect_subsequent_requests() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.html"))
            .unwrap()
            .write_all(b"<p>hi</p>")
            .unwrap();
        let coord = coordinator(&dir);

        let failed = coord.handle(&get("/missing.txt"), 0);
        assert_eq!(failed.status_code(), 404);

        let ok = coord.handle(&get("/a.html"), 1);
        assert_eq!(ok.status_code(), 200);
        assert_eq!(&ok.content()[..], b"<p>hi</p>");
    }

    /// 路径拼接不做规范化：`..` 段原样进入目标路径（沿袭的既有行为）
    #[test]
    fn test_resolve_preserves_dot_dot_segments() {
        let dir = TempDir::new().unwrap();
        let coord = coordinator(&dir);

        let target = coord.resolve("/../outside.txt");
        assert_eq!(target, dir.path().join("../outside.txt"));
    }
}
