//! Detail-page extraction
//!
//! A detail page is read into a map keyed by the page's own Chinese labels.
//! Four regions feed the map independently: the tag strip, the labelled
//! text sections, the transaction attribute list and the room layout table.
//! Sixteen of the labels are surfaced as fixed output columns (see
//! [`KnownDetail`]); the rest stay in the map as-is.

use crate::parser::{child_elements, direct_text, full_text};
use crate::state::DetailStatus;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Phrases shown instead of details when the session is not logged in
pub const LOGIN_MARKERS: &[&str] = &["登录查看更多房源信息", "需登录后查看完整信息"];

static TAG_LINKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class*="newwrap"][class*="baseinform"] div[class*="tags"] a"#)
        .expect("hardcoded selector is valid")
});
static SECTIONS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class*="newwrap"][class*="baseinform"] div[class*="baseattribute"]"#)
        .expect("hardcoded selector is valid")
});
static SECTION_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[class="content"]"#).expect("hardcoded selector is valid"));
static TRANSACTION_ITEMS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class*="transaction"] li"#).expect("hardcoded selector is valid")
});
static LAYOUT_ROWS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class*="layout-wrapper"] div[class*="row"]"#)
        .expect("hardcoded selector is valid")
});

/// Detail labels that get their own output column, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownDetail {
    Tags,
    SellingPoints,
    Community,
    Surroundings,
    Transport,
    TaxAnalysis,
    OwnershipMortgage,
    LastTransaction,
    ListedAt,
    TransactionOwnership,
    HouseUsage,
    HoldingPeriod,
    PropertyOwner,
    MortgageInfo,
    TransactionSummary,
    Layout,
}

impl KnownDetail {
    /// All known labels in output column order
    pub const ALL: [KnownDetail; 16] = [
        Self::Tags,
        Self::SellingPoints,
        Self::Community,
        Self::Surroundings,
        Self::Transport,
        Self::TaxAnalysis,
        Self::OwnershipMortgage,
        Self::LastTransaction,
        Self::ListedAt,
        Self::TransactionOwnership,
        Self::HouseUsage,
        Self::HoldingPeriod,
        Self::PropertyOwner,
        Self::MortgageInfo,
        Self::TransactionSummary,
        Self::Layout,
    ];

    /// The label as it appears on the page (and as the column header)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tags => "房源标签",
            Self::SellingPoints => "核心卖点",
            Self::Community => "小区介绍",
            Self::Surroundings => "周边配套",
            Self::Transport => "交通出行",
            Self::TaxAnalysis => "税费解析",
            Self::OwnershipMortgage => "权属抵押",
            Self::LastTransaction => "上次交易",
            Self::ListedAt => "挂牌时间",
            Self::TransactionOwnership => "交易权属",
            Self::HouseUsage => "房屋用途",
            Self::HoldingPeriod => "房屋年限",
            Self::PropertyOwner => "产权所属",
            Self::MortgageInfo => "抵押信息",
            Self::TransactionSummary => "交易属性",
            Self::Layout => "户型分间",
        }
    }

    /// Looks a page label up among the known ones
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.label() == label)
    }
}

/// Parsed detail page
///
/// `fields` is empty unless `status` is [`DetailStatus::Ok`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub status: DetailStatus,
    pub fields: BTreeMap<String, String>,
}

impl DetailRecord {
    fn login_required() -> Self {
        Self {
            status: DetailStatus::LoginRequired,
            fields: BTreeMap::new(),
        }
    }

    /// Value of a known label, if the page had it
    pub fn known(&self, field: KnownDetail) -> Option<&str> {
        self.fields.get(field.label()).map(String::as_str)
    }

    /// Value of any label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }
}

/// Parses a detail page
///
/// If either login marker appears anywhere in the body the result is
/// `LoginRequired` with no fields, whatever else the page contains.
///
/// # Example
///
/// ```
/// use lianjia_scout::{parse_detail, DetailStatus};
///
/// let record = parse_detail("<html><body>需登录后查看完整信息</body></html>");
/// assert_eq!(record.status, DetailStatus::LoginRequired);
/// assert!(record.fields.is_empty());
/// ```
pub fn parse_detail(html: &str) -> DetailRecord {
    if LOGIN_MARKERS.iter().any(|marker| html.contains(marker)) {
        return DetailRecord::login_required();
    }

    let document = Html::parse_document(html);
    let mut fields = BTreeMap::new();

    extract_tags(&document, &mut fields);
    extract_sections(&document, &mut fields);
    extract_transaction(&document, &mut fields);
    extract_layout(&document, &mut fields);

    DetailRecord {
        status: DetailStatus::Ok,
        fields,
    }
}

fn extract_tags(document: &Html, fields: &mut BTreeMap<String, String>) {
    let tags: Vec<String> = document.select(&TAG_LINKS).flat_map(direct_text).collect();
    if !tags.is_empty() {
        fields.insert(KnownDetail::Tags.label().to_string(), tags.join(" | "));
    }
}

/// Titled free-text sections such as 核心卖点 or 小区介绍
fn extract_sections(document: &Html, fields: &mut BTreeMap<String, String>) {
    for section in document.select(&SECTIONS) {
        let mut names = child_elements(section, "div", |class| class == "name").peekable();
        if names.peek().is_none() {
            continue;
        }
        let title = names.flat_map(direct_text).collect::<String>();
        let content = section
            .select(&SECTION_CONTENT)
            .map(full_text)
            .collect::<String>();
        let (title, content) = (title.trim(), content.trim());
        if !title.is_empty() && !content.is_empty() {
            fields.insert(title.to_string(), content.to_string());
        }
    }
}

/// Transaction attribute list: each pair is kept on its own and in a summary
fn extract_transaction(document: &Html, fields: &mut BTreeMap<String, String>) {
    let mut pairs = Vec::new();
    for item in document.select(&TRANSACTION_ITEMS) {
        let label = child_elements(item, "span", |class| class.contains("label"))
            .flat_map(direct_text)
            .collect::<String>();
        let value = child_elements(item, "span", |_| true)
            .skip(1)
            .map(|span| span.text().collect::<String>())
            .collect::<String>();
        let (label, value) = (label.trim(), value.trim());
        if !label.is_empty() && !value.is_empty() {
            fields.insert(label.to_string(), value.to_string());
            pairs.push(format!("{}:{}", label, value));
        }
    }
    if !pairs.is_empty() {
        fields.insert(
            KnownDetail::TransactionSummary.label().to_string(),
            pairs.join(" | "),
        );
    }
}

/// Room layout table; one line per row, cells slash-joined
fn extract_layout(document: &Html, fields: &mut BTreeMap<String, String>) {
    let rows: Vec<String> = document
        .select(&LAYOUT_ROWS)
        .filter_map(|row| {
            let cells: Vec<String> = child_elements(row, "div", |class| class.contains("col"))
                .map(full_text)
                .filter(|cell| !cell.is_empty())
                .collect();
            (!cells.is_empty()).then(|| cells.join(" / "))
        })
        .collect();
    if !rows.is_empty() {
        fields.insert(KnownDetail::Layout.label().to_string(), rows.join(" ; "));
    }
}
