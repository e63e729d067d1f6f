//! 异步解析模块
//!
//! 在阻塞线程池中并发处理解析队列，下载和存储都是阻塞调用

use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::fetch::TextFetcher;
use crate::parse_queue::{ParseQueue, ParseStatus, ParseTask};
use crate::service::{BookRef, BookService};
use crate::store::DocumentStore;

/// 单个任务的处理结果
#[derive(Debug)]
pub struct ParseOutcome {
    /// 文档存储键
    pub key: String,
    /// 成功时为存储键
    pub result: Result<String>,
}

/// 任务结束（包括 panic）时把它移出活动列表
struct ActiveGuard<'a> {
    queue: &'a ParseQueue,
    key: &'a str,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.queue.mark_completed(self.key) {
            warn!(key = self.key, "标记任务完成失败: {}", e);
        }
    }
}

/// 批量入队
///
/// # 返回
/// 实际入队的任务数（重复的书籍会被忽略）
pub fn enqueue_books(queue: &ParseQueue, books: impl IntoIterator<Item = BookRef>) -> Result<usize> {
    let mut added = 0;
    for book in books {
        if queue.enqueue(ParseTask::new(book))? {
            added += 1;
        }
    }
    Ok(added)
}

fn run_task<F, S>(service: &BookService<F, S>, queue: &ParseQueue, task: &ParseTask) -> Result<String>
where
    F: TextFetcher,
    S: DocumentStore,
{
    let _guard = ActiveGuard {
        queue,
        key: &task.key,
    };

    let report = |status: ParseStatus| {
        if let Err(e) = queue.update_status(&task.key, status) {
            warn!(key = %task.key, "更新任务状态失败: {}", e);
        }
    };

    let result = service.ensure_parsed_reporting(&task.book, &report);
    match &result {
        Ok(_) => report(ParseStatus::Completed),
        Err(e) => {
            error!(key = %task.key, "解析任务失败: {}", e);
            report(ParseStatus::Failed(e.to_string()));
        }
    }
    result
}

/// 处理解析队列
///
/// 按队列顺序取出任务，并发数受队列上限约束；队列清空且没有运行中的任务时返回
pub async fn process_parse_queue<F, S>(
    service: Arc<BookService<F, S>>,
    queue: Arc<ParseQueue>,
) -> Vec<ParseOutcome>
where
    F: TextFetcher + 'static,
    S: DocumentStore + 'static,
{
    let mut running: JoinSet<ParseOutcome> = JoinSet::new();
    let mut outcomes = Vec::new();

    loop {
        // 填满空闲槽位
        loop {
            let task = match queue.dequeue_active() {
                Ok(Some(task)) => task,
                Ok(None) => break,
                Err(e) => {
                    error!("获取任务失败: {}", e);
                    break;
                }
            };

            let service = Arc::clone(&service);
            let queue = Arc::clone(&queue);
            running.spawn_blocking(move || {
                let result = run_task(&service, &queue, &task);
                ParseOutcome {
                    key: task.key,
                    result,
                }
            });
        }

        match running.join_next().await {
            Some(Ok(outcome)) => {
                info!(key = %outcome.key, ok = outcome.result.is_ok(), "解析任务结束");
                outcomes.push(outcome);
            }
            Some(Err(e)) => error!("解析任务异常退出: {}", e),
            None => {
                if queue.queue_size() == 0 {
                    break;
                }
                // 槽位被外部任务占用，稍后重试
                sleep(Duration::from_millis(100)).await;
            }
        }
    }

    outcomes
}
