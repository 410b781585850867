//! 归一化后的图书记录
//!
//! 提供方返回的 [`Volume`] 字段参差不齐，[`CatalogRecord::from_volume`] 按固定的默认值策略补齐：
//!
//! | 源字段缺失 | 归一化结果 |
//! |------------|-----------|
//! | `authors` | `["No author to display"]` |
//! | `description` | `""` |
//! | `imageLinks.thumbnail` | `""` |

pub mod types;

pub use types::{ImageLinks, Volume, VolumeInfo, VolumeList};

use serde::{Deserialize, Serialize};

/// 缺少作者时使用的占位作者
pub const NO_AUTHOR_PLACEHOLDER: &str = "No author to display";

/// 一条归一化后的检索结果，构造后不可变
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    id: String,
    title: String,
    authors: Vec<String>,
    description: String,
    image_url: String,
}

impl CatalogRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        authors: Vec<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors,
            description: description.into(),
            image_url: image_url.into(),
        }
    }

    pub fn from_volume(volume: Volume) -> Self {
        let image_url = volume.volume_info.thumbnail().unwrap_or_default().to_string();
        let VolumeInfo {
            title,
            authors,
            description,
            ..
        } = volume.volume_info;

        Self {
            id: volume.id,
            title,
            authors: authors.unwrap_or_else(|| vec![NO_AUTHOR_PLACEHOLDER.to_string()]),
            description: description.unwrap_or_default(),
            image_url,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// 封面地址，没有封面时为空串
    pub fn image_url(&self) -> &str {
        &self.image_url
    }
}

impl From<Volume> for CatalogRecord {
    fn from(volume: Volume) -> Self {
        CatalogRecord::from_volume(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<CatalogRecord> {
        let list: VolumeList = serde_json::from_str(json).unwrap();
        list.items.into_iter().map(CatalogRecord::from).collect()
    }

    #[test]
    fn test_full_volume() {
        let records = parse(
            r#"{"items":[{"id":"zyTCAlFPjgYC","volumeInfo":{
                "title":"The Google Story",
                "authors":["David A. Vise","Mark Malseed"],
                "description":"Inside the company",
                "imageLinks":{"smallThumbnail":"s","thumbnail":"http://img/t.jpg"}}}]}"#,
        );
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id(), "zyTCAlFPjgYC");
        assert_eq!(r.title(), "The Google Story");
        assert_eq!(r.authors(), ["David A. Vise", "Mark Malseed"]);
        assert_eq!(r.description(), "Inside the company");
        assert_eq!(r.image_url(), "http://img/t.jpg");
    }

    #[test]
    fn test_missing_authors_uses_placeholder() {
        let records = parse(r#"{"items":[{"id":"a","volumeInfo":{"title":"Anon"}}]}"#);
        assert_eq!(records[0].authors(), [NO_AUTHOR_PLACEHOLDER]);
    }

    #[test]
    fn test_missing_thumbnail_yields_empty_image() {
        // imageLinks 整体缺失，或存在但没有 thumbnail
        let records = parse(
            r#"{"items":[
                {"id":"a","volumeInfo":{"title":"A"}},
                {"id":"b","volumeInfo":{"title":"B","imageLinks":{"smallThumbnail":"s"}}}
            ]}"#,
        );
        assert_eq!(records[0].image_url(), "");
        assert_eq!(records[1].image_url(), "");
        assert_eq!(records[0].description(), "");
    }

    #[test]
    fn test_zero_hits_without_items_key() {
        let records = parse(r#"{"kind":"books#volumes","totalItems":0}"#);
        assert!(records.is_empty());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let records = parse(
            r#"{"items":[
                {"id":"A1","volumeInfo":{"title":"The Hobbit"}},
                {"id":"B2","volumeInfo":{"title":"Other"}},
                {"id":"A1","volumeInfo":{"title":"The Hobbit"}}
            ]}"#,
        );
        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, ["A1", "B2", "A1"]);
    }
}
