// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 文件服务器协议参数与常量模块
//!
//! 该模块定义了 `shaneyale-fileserver` 遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 常见的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 错误页与目录列表页的 HTML 模板。
//! - HTTP 方法与版本的强类型枚举。

use std::collections::HashMap;
use lazy_static::lazy_static;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "shaneyale-fileserver";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 隐藏文件的命名前缀，带此前缀的目录项不会出现在列表页中
pub const HIDDEN_PREFIX: char = '.';

/// 错误页模板。`{path}` 与 `{msg}` 两个占位符在渲染时被替换。
pub const ERROR_PAGE: &str = r"<html>
<body>
<h1>Error accessing {path}</h1>
<p>{msg}</p>
</body>
</html>
";

/// 目录列表页模板。`{path}` 为请求路径，`{entries}` 为 `<li>` 项组成的块。
pub const LISTING_PAGE: &str = r"<html>
<body>
<h1>Listing for {path}</h1>
<ul>
{entries}
</ul>
</body>
</html>
";

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    /// 仅保留本服务器实际会发出的状态码。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(400, "Bad Request");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(500, "Internal Server Error");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy)]
pub enum HttpVersion {
    /// HTTP/1.1 版本
    V1_1,
}

/// 标准 HTTP 请求方法。本服务器仅处理资源获取，其余方法在传输层即被拒绝。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
}

use std::fmt;

impl fmt::Display for HttpVersion {
    /// 将枚举格式化为 HTTP 报文中的版本字符串
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_1 => write!(f, "1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
        }
    }
}
