use num_cpus;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use core::str;
use log::error;
use std::fs::File;
use std::io::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    root: String,
    port: u16,
    worker_threads: usize,
    local: bool,
    #[serde(default = "default_index_file")]
    index_file: String,
    #[serde(default = "default_script_suffix")]
    script_suffix: String,
    #[serde(default = "default_script_interpreter")]
    script_interpreter: String,
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_script_suffix() -> String {
    ".py".to_string()
}

fn default_script_interpreter() -> String {
    "python3".to_string()
}

impl Config {
    pub fn new() -> Self {
        Self {
            root: ".".to_string(),
            port: 7878,
            worker_threads: 0,
            local: true,
            index_file: default_index_file(),
            script_suffix: default_script_suffix(),
            script_interpreter: default_script_interpreter(),
        }
    }

    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => panic!("no such file {} exception:{}", filename, e),
        };
        let mut str_val = String::new();
        match file.read_to_string(&mut str_val) {
            Ok(s) => s,
            Err(e) => panic!("Error Reading file: {}", e),
        };

        let mut raw_config: Config = match toml::from_str(&str_val) {
            Ok(t) => t,
            Err(_) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置");
                Config::new()
            }
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        raw_config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn index_file(&self) -> &str {
        &self.index_file
    }

    pub fn script_suffix(&self) -> &str {
        &self.script_suffix
    }

    pub fn script_interpreter(&self) -> &str {
        &self.script_interpreter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.root(), ".");
        assert_eq!(config.port(), 7878);
        assert_eq!(config.index_file(), "index.html");
        assert_eq!(config.script_suffix(), ".py");
        assert_eq!(config.script_interpreter(), "python3");
    }

    #[test]
    fn test_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "root = \"/srv/www\"\nport = 8080\nworker_threads = 2\nlocal = false\n"
        )
        .unwrap();

        let config = Config::from_toml(path.to_str().unwrap());
        assert_eq!(config.root(), "/srv/www");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.worker_threads(), 2);
        assert!(!config.local());
        // 未显式给出的字段取默认值
        assert_eq!(config.index_file(), "index.html");
        assert_eq!(config.script_interpreter(), "python3");
    }

    #[test]
    fn test_zero_worker_threads_falls_back_to_cpu_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "root = \".\"\nport = 7878\nworker_threads = 0\nlocal = true\n"
        )
        .unwrap();

        let config = Config::from_toml(path.to_str().unwrap());
        assert!(config.worker_threads() > 0);
    }
}
