//! 搜索提供方（Google Books volumes 接口）的原始响应类型
//!
//! 只声明实际用到的字段，其余字段由 serde 忽略。

use serde::{Deserialize, Serialize};

/// `GET /volumes?q=...` 的响应体；零命中时提供方不返回 `items`
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VolumeList {
    #[serde(default)]
    pub items: Vec<Volume>,
}

/// 单条检索命中
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Volume {
    pub id: String,
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VolumeInfo {
    /// 缺失属于数据质量问题，这里按空串处理，不让整次检索失败
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imageLinks", skip_serializing_if = "Option::is_none")]
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ImageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl VolumeInfo {
    /// 封面缩略图地址（`imageLinks.thumbnail`），任意一层缺失都返回 `None`
    pub fn thumbnail(&self) -> Option<&str> {
        self.image_links
            .as_ref()
            .and_then(|links| links.thumbnail.as_deref())
    }
}
