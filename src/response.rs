// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应报文构建模块
//!
//! 该模块负责把规则动作产出的内容（或异常）序列化为完整的 HTTP 响应字节流。
//! 每个代码路径的终点都在这里：要么是成功内容，要么是 404 错误页，
//! 每个请求恰好发送一个响应。
//!
//! `Content-Type` 固定为 `text/html`，无论被服务的文件真实类型是什么。
//! 这是刻意保留的简化，不做类型嗅探。

use crate::{
    exception::Exception,
    param::{HttpVersion, CRLF, SERVER_NAME, STATUS_CODES},
    util::render_error_page,
};

use bytes::Bytes;
use chrono::prelude::*;

/// 规则动作的成功产物：状态码与响应体字节。
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContent {
    pub status: u16,
    pub content: Bytes,
}

impl ResponseContent {
    pub fn ok(content: Bytes) -> Self {
        Self {
            status: 200,
            content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_length: u64,
    date: DateTime<Utc>,
    server_name: String,
    content: Bytes,
}

impl Response {
    fn new(status_code: u16, content: Bytes) -> Self {
        let information = STATUS_CODES
            .get(&status_code)
            .copied()
            .unwrap_or("Unknown")
            .to_string();
        Self {
            version: HttpVersion::V1_1,
            status_code,
            information,
            content_length: content.len() as u64,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            content,
        }
    }

    /// 从规则动作的成功产物构建响应。
    pub fn from_content(content: ResponseContent) -> Self {
        Self::new(content.status, content.content)
    }

    /// 从协调器捕获的异常构建 404 错误页响应。
    ///
    /// 所有失败种类统一映射为 404，异常描述嵌入错误页正文。
    pub fn from_exception(request_path: &str, exception: &Exception) -> Self {
        let page = render_error_page(request_path, &exception.to_string());
        Self::new(404, Bytes::from(page))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let version: &str = match self.version {
            HttpVersion::V1_1 => "HTTP/1.1",
        };
        let status_code: &str = &self.status_code.to_string();
        let information: &str = &self.information;
        let content_length: &str = &self.content_length.to_string();
        let date: &str = &format_date(&self.date);
        let server: &str = &self.server_name;

        let header = [
            version,
            " ",
            status_code,
            " ",
            information,
            CRLF,
            "Content-Type: text/html",
            CRLF,
            "Content-Length: ",
            content_length,
            CRLF,
            "Date: ",
            date,
            CRLF,
            "Server: ",
            server,
            CRLF,
            CRLF,
        ]
        .concat();
        [header.as_bytes(), &self.content[..]].concat()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}
