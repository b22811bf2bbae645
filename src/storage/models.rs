use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum::{AsRefStr, EnumString};

/// 链接健康状态，数据库中以小整数存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr, Default)]
#[repr(i16)]
pub enum LinkStatus {
    Unknown = 0,
    #[default]
    Ok = 1,
    Moved = 2,
    Broken = 3,
}

impl LinkStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// 未知数值回落为 Unknown
    pub fn from_i16(value: i16) -> Self {
        match value {
            1 => LinkStatus::Ok,
            2 => LinkStatus::Moved,
            3 => LinkStatus::Broken,
            _ => LinkStatus::Unknown,
        }
    }

    /// 按 HTTP 状态码分类
    pub fn from_http_status(code: u16) -> Self {
        match code {
            200..=299 => LinkStatus::Ok,
            300..=399 => LinkStatus::Moved,
            _ => LinkStatus::Broken,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkStatus::Unknown => "unknown",
            LinkStatus::Ok => "ok",
            LinkStatus::Moved => "moved",
            LinkStatus::Broken => "broken",
        }
    }
}

/// 可软删除的实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntityKind {
    Link,
    List,
    Tag,
}

/// 列表或标签；两者共用页面和服务实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CollectionKind {
    List,
    Tag,
}

impl CollectionKind {
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::List => "List",
            CollectionKind::Tag => "Tag",
        }
    }
}

impl From<CollectionKind> for EntityKind {
    fn from(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::List => EntityKind::List,
            CollectionKind::Tag => EntityKind::Tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i32,
    pub user_id: i32,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_private: bool,
    pub status: LinkStatus,
    pub check_disabled: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkList {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 链接及其关联的标签和列表
#[derive(Debug, Clone, Serialize)]
pub struct LinkDetails {
    #[serde(flatten)]
    pub link: Link,
    pub tags: Vec<Tag>,
    pub lists: Vec<LinkList>,
}

/// 标签/列表的写入数据
#[derive(Debug, Clone)]
pub struct CollectionWrite {
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
}

/// 链接写入时提交的标签引用
///
/// 浏览器表单允许直接输入新标签名，保存时按名称查找或创建。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagRef {
    Id(i32),
    Name(String),
}

/// 链接的标量字段和关系（None 表示保持原关系不变）
#[derive(Debug, Clone)]
pub struct LinkWrite {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_private: bool,
    pub tags: Option<Vec<TagRef>>,
    pub lists: Option<Vec<i32>>,
    /// 按名称新建标签时使用的私有默认值
    pub new_tags_private: bool,
}

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOrderColumn {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkOrder {
    pub column: LinkOrderColumn,
    pub direction: OrderDirection,
}

impl LinkOrder {
    /// 解析查询参数，非法值回落到默认排序
    pub fn parse(column: Option<&str>, direction: Option<&str>) -> Self {
        let column = match column.unwrap_or_default() {
            "updated_at" => LinkOrderColumn::UpdatedAt,
            "title" => LinkOrderColumn::Title,
            "url" => LinkOrderColumn::Url,
            _ => LinkOrderColumn::CreatedAt,
        };
        let direction = match direction.map(|d| d.to_ascii_lowercase()).as_deref() {
            Some("asc") => OrderDirection::Asc,
            _ => OrderDirection::Desc,
        };
        Self { column, direction }
    }
}

pub const MAX_PER_PAGE: u64 = 100;

/// 分页请求，页码从 1 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// 超大页码饱和到 i64::MAX，数据库侧按空页处理
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let last_page = total.div_ceil(request.per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset().saturating_add(1);
            (Some(from), Some(from.saturating_add(data.len() as u64 - 1)))
        };
        Self {
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page,
            from,
            to,
            data,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            from: self.from,
            to: self.to,
            data: self.data.into_iter().map(f).collect(),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}
