use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::{ReaderError, Result};
use crate::service::BookRef;

/// 解析状态枚举
///
/// 表示解析任务的各个阶段
#[derive(Clone, Debug, PartialEq)]
pub enum ParseStatus {
    /// 等待处理
    Pending,
    /// 正在下载原始文本
    Fetching,
    /// 正在解析
    Parsing,
    /// 正在保存文档
    Storing,
    /// 完成
    Completed,
    /// 失败（包含错误信息）
    Failed(String),
}

/// 解析任务
#[derive(Clone, Debug)]
pub struct ParseTask {
    /// 文档存储键（任务唯一标识）
    pub key: String,
    /// 书籍
    pub book: BookRef,
    /// 当前状态
    pub status: ParseStatus,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl ParseTask {
    pub fn new(book: BookRef) -> Self {
        Self {
            key: book.document_key(),
            book,
            status: ParseStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// 解析队列
///
/// 同一个文档键在队列中或处理中时不会重复入队，保证每本书最多解析一次；
/// 同时限制并发任务数
pub struct ParseQueue {
    /// 待处理任务队列
    tasks: Arc<Mutex<VecDeque<ParseTask>>>,
    /// 正在处理的任务（key -> task）
    active_tasks: Arc<Mutex<HashMap<String, ParseTask>>>,
    /// 最大并发任务数
    max_concurrent: usize,
}

impl ParseQueue {
    /// 创建新的解析队列
    ///
    /// # 参数
    /// - `max_concurrent`: 最大并发任务数
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(VecDeque::new())),
            active_tasks: Arc::new(Mutex::new(HashMap::new())),
            max_concurrent,
        }
    }

    /// 将任务加入队列
    ///
    /// # 返回
    /// - Ok(true): 已入队
    /// - Ok(false): 同键任务已在队列中或处理中，本次被忽略
    pub fn enqueue(&self, task: ParseTask) -> Result<bool> {
        let mut tasks = self.tasks.lock()
            .map_err(|e| ReaderError::Queue(format!("锁定任务队列失败: {}", e)))?;
        let active = self.active_tasks.lock()
            .map_err(|e| ReaderError::Queue(format!("锁定活动任务失败: {}", e)))?;

        if active.contains_key(&task.key) || tasks.iter().any(|t| t.key == task.key) {
            return Ok(false);
        }

        tasks.push_back(task);
        Ok(true)
    }

    /// 从队列中取出任务并标记为活动状态
    ///
    /// 出队和登记为活动在同一次加锁内完成，任务在任何时刻都处于等待或活动之一，
    /// 同键任务因此无法在两者之间的空隙重新入队。
    /// 如果当前活动任务数已达上限，返回 None
    pub fn dequeue_active(&self) -> Result<Option<ParseTask>> {
        let mut tasks = self.tasks.lock()
            .map_err(|e| ReaderError::Queue(format!("锁定任务队列失败: {}", e)))?;
        let mut active = self.active_tasks.lock()
            .map_err(|e| ReaderError::Queue(format!("锁定活动任务失败: {}", e)))?;

        // 检查是否已达并发上限
        if active.len() >= self.max_concurrent {
            return Ok(None);
        }

        let Some(task) = tasks.pop_front() else {
            return Ok(None);
        };
        active.insert(task.key.clone(), task.clone());
        Ok(Some(task))
    }

    /// 标记任务为完成，移出活动列表
    pub fn mark_completed(&self, key: &str) -> Result<()> {
        let mut active = self.active_tasks.lock()
            .map_err(|e| ReaderError::Queue(format!("锁定活动任务失败: {}", e)))?;
        active.remove(key);
        Ok(())
    }

    /// 获取任务状态
    pub fn get_status(&self, key: &str) -> Option<ParseTask> {
        let active = self.active_tasks.lock().ok()?;
        active.get(key).cloned()
    }

    /// 更新任务状态
    pub fn update_status(&self, key: &str, status: ParseStatus) -> Result<()> {
        let mut active = self.active_tasks.lock()
            .map_err(|e| ReaderError::Queue(format!("锁定活动任务失败: {}", e)))?;

        if let Some(task) = active.get_mut(key) {
            task.status = status;
        }

        Ok(())
    }

    /// 获取队列中的任务数量
    pub fn queue_size(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// 获取活动任务数量
    pub fn active_count(&self) -> usize {
        self.active_tasks.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// 检查是否有空闲槽位
    pub fn has_capacity(&self) -> bool {
        self.active_count() < self.max_concurrent
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

impl Default for ParseQueue {
    fn default() -> Self {
        Self::new(3) // 默认最多 3 个并发任务
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_task(id: i64) -> ParseTask {
        ParseTask::new(BookRef {
            id,
            title: format!("Book {}", id),
            language: "EN".to_string(),
            text_url: format!("https://example.org/{}.txt", id),
        })
    }

    #[test]
    fn test_queue_creation() {
        let queue = ParseQueue::new(3);
        assert_eq!(queue.queue_size(), 0);
        assert_eq!(queue.active_count(), 0);
        assert!(queue.has_capacity());
    }

    #[test]
    fn test_task_key() {
        assert_eq!(create_test_task(7).key, "books/7/EN/Book_7.json");
        assert_eq!(create_test_task(7).status, ParseStatus::Pending);
    }

    #[test]
    fn test_enqueue_dequeue() {
        let queue = ParseQueue::new(3);

        assert!(queue.enqueue(create_test_task(1)).unwrap());
        assert_eq!(queue.queue_size(), 1);

        let dequeued = queue.dequeue_active().unwrap();
        assert_eq!(dequeued.unwrap().book.id, 1);
        assert_eq!(queue.queue_size(), 0);
        assert_eq!(queue.active_count(), 1);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let queue = ParseQueue::new(3);
        assert!(queue.enqueue(create_test_task(1)).unwrap());
        // 已在队列中
        assert!(!queue.enqueue(create_test_task(1)).unwrap());
        assert_eq!(queue.queue_size(), 1);

        // 处理中
        queue.dequeue_active().unwrap().unwrap();
        assert!(!queue.enqueue(create_test_task(1)).unwrap());

        // 完成后可以再次入队
        queue.mark_completed("books/1/EN/Book_1.json").unwrap();
        assert!(queue.enqueue(create_test_task(1)).unwrap());
    }

    #[test]
    fn test_same_key_rejected_right_after_dequeue() {
        let queue = ParseQueue::new(3);
        assert!(queue.enqueue(create_test_task(1)).unwrap());

        let task = queue.dequeue_active().unwrap().unwrap();
        // 出队后立即再次入队同一本书
        assert!(!queue.enqueue(create_test_task(1)).unwrap());
        assert_eq!(queue.queue_size(), 0);
        assert_eq!(queue.get_status(&task.key).unwrap().status, ParseStatus::Pending);
    }

    #[test]
    fn test_dequeue_from_empty_queue() {
        let queue = ParseQueue::new(1);
        assert!(queue.dequeue_active().unwrap().is_none());
        assert_eq!(queue.active_count(), 0);
    }

    #[test]
    fn test_concurrent_limit() {
        let queue = ParseQueue::new(2);

        for i in 1..=3 {
            queue.enqueue(create_test_task(i)).unwrap();
        }
        assert_eq!(queue.queue_size(), 3);

        queue.dequeue_active().unwrap().unwrap();
        queue.dequeue_active().unwrap().unwrap();
        assert_eq!(queue.active_count(), 2);

        // 已达上限
        assert!(queue.dequeue_active().unwrap().is_none());
        assert_eq!(queue.queue_size(), 1);
        assert!(!queue.has_capacity());
    }

    #[test]
    fn test_update_status() {
        let queue = ParseQueue::new(3);
        let task = create_test_task(1);
        let key = task.key.clone();

        queue.enqueue(task).unwrap();
        queue.dequeue_active().unwrap().unwrap();

        queue.update_status(&key, ParseStatus::Parsing).unwrap();
        assert_eq!(queue.get_status(&key).unwrap().status, ParseStatus::Parsing);
        assert!(queue.get_status("books/999/EN/x.json").is_none());

        queue.mark_completed(&key).unwrap();
        assert_eq!(queue.active_count(), 0);
    }

    #[test]
    fn test_fifo_order() {
        let queue = ParseQueue::new(3);
        for i in 1..=5 {
            queue.enqueue(create_test_task(i)).unwrap();
        }

        for i in 1..=5 {
            let task = queue.dequeue_active().unwrap().unwrap();
            assert_eq!(task.book.id, i);
            queue.mark_completed(&task.key).unwrap();
        }
        assert_eq!(queue.queue_size(), 0);
    }

    #[test]
    fn test_parse_status_equality() {
        assert_eq!(ParseStatus::Pending, ParseStatus::Pending);
        assert_ne!(ParseStatus::Pending, ParseStatus::Parsing);
        assert_eq!(
            ParseStatus::Failed("error".to_string()),
            ParseStatus::Failed("error".to_string())
        );
    }
}
