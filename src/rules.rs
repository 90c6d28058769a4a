// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 规则链分发模块
//!
//! 该模块是文件服务器的核心：一条由 (谓词, 动作) 值对组成的有序规则链。
//! 对每个已解析的目标路径，按固定优先级线性扫描谓词，首个命中的规则
//! 执行其动作，扫描随即短路。
//!
//! ## 规则顺序（不可调换）
//! 1. `no-target` — 目标不存在，先于一切类型判断，避免对缺失路径做文件系统操作。
//! 2. `script-target` — 脚本检测必须先于普通文件服务，否则脚本会被当作静态内容发出。
//! 3. `existing-file` — 普通文件直接读出。
//! 4. `directory-with-index` — 含索引文件的目录等价于服务该索引文件。
//! 5. `directory-without-index` — 其余目录渲染列表页。
//! 6. `fallback` — 谓词恒真，保证链必然终止且恰好执行一个动作。
//!
//! 规则链在进程启动时构造一次，之后只读，可被任意数量的在途请求并发访问。

use std::path::Path;

use log::debug;

use crate::{
    config::Config,
    exception::Exception,
    response::ResponseContent,
    util::{execute_script, list_visible_entries, read_file_bytes, render_listing_page},
};

use bytes::Bytes;

/// 规则谓词与动作共同依赖的分发参数。
///
/// 索引文件名、脚本后缀与解释器在启动时从配置取得，此后不再变化。
#[derive(Debug, Clone)]
pub struct ChainSettings {
    index_file: String,
    script_suffix: String,
    interpreter: String,
}

impl ChainSettings {
    pub fn new(index_file: &str, script_suffix: &str, interpreter: &str) -> Self {
        Self {
            index_file: index_file.to_string(),
            script_suffix: script_suffix.to_string(),
            interpreter: interpreter.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.index_file(),
            config.script_suffix(),
            config.script_interpreter(),
        )
    }

    pub fn index_file(&self) -> &str {
        &self.index_file
    }

    pub fn script_suffix(&self) -> &str {
        &self.script_suffix
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

/// 一次分发中规则可见的全部上下文。
///
/// `target` 在每个请求开始时解析一次，链上所有规则看到同一个值。
pub struct DispatchContext<'a> {
    /// 已解析的文件系统目标路径
    pub target: &'a Path,
    /// 客户端最初请求的路径，异常描述与列表页标题嵌入的是它
    pub request_path: &'a str,
    /// 链级配置
    pub settings: &'a ChainSettings,
    /// 全局请求 ID，用于日志追踪
    pub id: u128,
}

type Predicate = fn(&DispatchContext) -> bool;
type Action = fn(&DispatchContext) -> Result<ResponseContent, Exception>;

/// 一条规则：命中谓词与对应动作的值对。构造后不可变。
pub struct Rule {
    name: &'static str,
    applies: Predicate,
    run: Action,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 有序规则链。末位规则谓词恒真，链的求值必然终止。
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl RuleChain {
    /// 构造标准六规则链。进程启动时调用一次，之后只读共享。
    pub fn standard() -> Self {
        Self {
            rules: vec![
                Rule {
                    name: "no-target",
                    applies: |ctx| !ctx.target.exists(),
                    run: |ctx| Err(Exception::NotFound(ctx.request_path.to_string())),
                },
                Rule {
                    name: "script-target",
                    applies: |ctx| {
                        ctx.target.is_file()
                            && ctx
                                .target
                                .file_name()
                                .map(|n| {
                                    n.to_string_lossy().ends_with(ctx.settings.script_suffix())
                                })
                                .unwrap_or(false)
                    },
                    run: |ctx| {
                        let stdout = execute_script(
                            ctx.settings.interpreter(),
                            ctx.target,
                            ctx.request_path,
                            ctx.id,
                        )?;
                        Ok(ResponseContent::ok(stdout))
                    },
                },
                Rule {
                    name: "existing-file",
                    applies: |ctx| ctx.target.is_file(),
                    run: |ctx| {
                        let contents = read_file_bytes(ctx.target, ctx.request_path)?;
                        Ok(ResponseContent::ok(contents))
                    },
                },
                Rule {
                    name: "directory-with-index",
                    applies: |ctx| {
                        ctx.target.is_dir()
                            && ctx.target.join(ctx.settings.index_file()).is_file()
                    },
                    run: |ctx| {
                        let index = ctx.target.join(ctx.settings.index_file());
                        let contents = read_file_bytes(&index, ctx.request_path)?;
                        Ok(ResponseContent::ok(contents))
                    },
                },
                Rule {
                    name: "directory-without-index",
                    applies: |ctx| ctx.target.is_dir(),
                    run: |ctx| {
                        let entries = list_visible_entries(ctx.target, ctx.request_path)?;
                        let page = render_listing_page(ctx.request_path, &entries);
                        Ok(ResponseContent::ok(Bytes::from(page)))
                    },
                },
                Rule {
                    name: "fallback",
                    applies: |_| true,
                    run: |ctx| Err(Exception::UnknownObject(ctx.request_path.to_string())),
                },
            ],
        }
    }

    /// 线性扫描规则链，执行首个谓词命中的动作。
    ///
    /// 兜底规则恒真，所以每次分发恰好执行一个动作。
    pub fn dispatch(&self, ctx: &DispatchContext) -> Result<ResponseContent, Exception> {
        for rule in &self.rules {
            if (rule.applies)(ctx) {
                debug!("[ID{}]规则命中：{}", ctx.id, rule.name);
                return (rule.run)(ctx);
            }
        }
        // 不可达：兜底规则保证链总有命中
        Err(Exception::UnknownObject(ctx.request_path.to_string()))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}
