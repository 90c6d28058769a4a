// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了文件服务器在请求处理生命周期中可能抛出的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了协议解析错误、文件系统错误以及外部脚本执行错误。
//! - **单点捕获**：规则动作产生的每个异常都在协调器边界被捕获恰好一次，
//!   并统一转换为携带异常描述的 404 错误页。
//! - **用户友好**：通过实现 `std::fmt::Display`，异常描述可以被安全地
//!   记录到日志或嵌入返回给客户端的错误页。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
/// 携带的字符串字段为客户端最初请求的路径以及（若有）底层错误的描述。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 客户端使用了服务器不支持的 HTTP 方法（仅支持 GET）。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 解析到的目标在文件系统上不存在。在 Web 语义中对应 `404 Not Found`。
    NotFound(String),
    /// 目标文件存在但读取失败（权限不足，或检测与读取之间文件消失）。
    UnreadableFile { path: String, cause: String },
    /// 目标目录存在但枚举其内容失败。
    UnlistableDirectory { path: String, cause: String },
    /// 外部解释器无法启动，或脚本以非零状态码退出。
    ScriptExecutionFailure { path: String, cause: String },
    /// 目标存在但不属于任何已知形态（例如特殊文件），由兜底规则抛出。
    UnknownObject(String),
}

use Exception::*;

/// 为 `Exception` 实现 `Display` 特性，使其支持字符串格式化输出。
///
/// 这些描述信息会直接嵌入返回给客户端的错误页正文，因此格式是对外契约的
/// 一部分：`NotFound` 的描述必须包含 `'{path}' not found` 字样。
impl fmt::Display for Exception {
    /// 根据错误类型写入人类可读的描述文本。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            NotFound(path) => write!(f, "'{}' not found", path),
            UnreadableFile { path, cause } => {
                write!(f, "'{}' cannot be read: {}", path, cause)
            }
            UnlistableDirectory { path, cause } => {
                write!(f, "'{}' cannot be listed: {}", path, cause)
            }
            ScriptExecutionFailure { path, cause } => {
                write!(f, "'{}' cannot be executed: {}", path, cause)
            }
            UnknownObject(path) => write!(f, "Unknown object '{}'", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// NotFound 的描述是对外契约，必须包含带引号的路径与 "not found"
    #[test]
    fn test_not_found_message() {
        let e = Exception::NotFound("/missing.txt".to_string());
        assert_eq!(e.to_string(), "'/missing.txt' not found");
    }

    #[test]
    fn test_script_failure_message() {
        let e = Exception::ScriptExecutionFailure {
            path: "/broken.py".to_string(),
            cause: "exit status: 1".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'/broken.py' cannot be executed"));
        assert!(msg.contains("exit status: 1"));
    }

    #[test]
    fn test_unreadable_file_message() {
        let e = Exception::UnreadableFile {
            path: "/secret".to_string(),
            cause: "permission denied".to_string(),
        };
        assert!(e.to_string().contains("cannot be read"));
    }

    #[test]
    fn test_unlistable_directory_message() {
        let e = Exception::UnlistableDirectory {
            path: "/dir".to_string(),
            cause: "permission denied".to_string(),
        };
        assert!(e.to_string().contains("cannot be listed"));
    }
}
