use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::db;
use crate::error::{ReaderError, Result};
use crate::parser::Document;

/// 文档存储 trait
///
/// 解析结果的持久化协作者
pub trait DocumentStore: Send + Sync {
    /// 键是否存在
    fn exists(&self, key: &str) -> Result<bool>;

    /// 保存文档（整体替换同键的旧文档）
    fn store(&self, key: &str, document: &Document) -> Result<()>;

    /// 读取文档，键不存在时返回 `DocumentNotFound`
    fn retrieve(&self, key: &str) -> Result<Document>;
}

/// 生成文档存储键
///
/// 格式：books/{book_id}/{language}/{title}.json，标题中的空格替换为下划线
pub fn document_key(book_id: i64, language: &str, title: &str) -> String {
    format!("books/{}/{}/{}.json", book_id, language, title.replace(' ', "_"))
}

/// 计算内容哈希（SHA256 十六进制）
pub fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 基于 SQLite 的文档存储
///
/// 文档以格式化的 JSON 保存，同时记录内容哈希用于读取时校验
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// 打开（或创建）数据库文件
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::init_db(path)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// 内存数据库
    pub fn in_memory() -> Result<Self> {
        let conn = db::init_memory_db()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ReaderError::Storage(format!("锁定数据库连接失败: {}", e)))
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn exists(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM documents WHERE doc_key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn store(&self, key: &str, document: &Document) -> Result<()> {
        let body = serde_json::to_string_pretty(document)?;
        let hash = content_hash(&body);

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO documents (doc_key, title, body, content_hash, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![key, &document.title, &body, &hash, Utc::now().to_rfc3339()],
        )?;

        debug!(key, bytes = body.len(), "文档已保存");
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Document> {
        let conn = self.lock()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT body, content_hash FROM documents WHERE doc_key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (body, hash) = row.ok_or_else(|| ReaderError::DocumentNotFound(key.to_string()))?;
        if content_hash(&body) != hash {
            return Err(ReaderError::Storage(format!("内容校验失败: {}", key)));
        }

        Ok(serde_json::from_str(&body)?)
    }
}
