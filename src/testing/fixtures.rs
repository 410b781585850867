//! 测试数据与一次性 HTTP 服务

use crate::catalog::{CatalogRecord, Volume, VolumeInfo};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// 只有 id 和标题的原始命中（作者、简介、封面都缺失）
pub fn volume(id: &str, title: &str) -> Volume {
    Volume {
        id: id.to_string(),
        volume_info: VolumeInfo {
            title: title.to_string(),
            ..VolumeInfo::default()
        },
    }
}

pub fn record(id: &str, title: &str) -> CatalogRecord {
    CatalogRecord::from_volume(volume(id, title))
}

/// 系统临时目录下一个不存在的唯一路径
pub fn temp_path(prefix: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "book-finder-{prefix}-{}-{nanos}-{}.json",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ))
}

/// 只接受一个连接的 HTTP 服务：返回固定状态码和响应体，并交出收到的原始请求
pub struct OneShotServer {
    addr: SocketAddr,
    request: JoinHandle<String>,
}

impl OneShotServer {
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.into();

        let request = tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return String::new();
            };
            let raw = read_request(&mut socket).await;
            let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            raw
        });

        Self { addr, request }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// 等待并返回收到的完整请求（请求行 + 头 + 体）
    pub async fn request(self) -> String {
        self.request.await.unwrap_or_default()
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(header_end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
