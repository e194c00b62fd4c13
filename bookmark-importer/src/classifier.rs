//! Heuristic classification
//!
//! Category names map to an icon and a color through exact lookups; bookmark
//! tags come from case-insensitive keyword matches against title and URL.
//! All tables are plain configuration and can be replaced wholesale.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One tag and the keywords that trigger it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: String,
    pub keywords: Vec<String>,
}

impl TagRule {
    pub fn new(tag: &str, keywords: &[&str]) -> Self {
        Self {
            tag: tag.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Lookup tables driving the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Category name -> icon reference
    pub icons: HashMap<String, String>,
    /// Category name -> color reference
    pub colors: HashMap<String, String>,
    pub default_icon: String,
    pub default_color: String,
    pub tag_rules: Vec<TagRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let icons = [
            ("AI 笔记", "fa-brain"),
            ("开发", "fa-code"),
            ("工具", "fa-tools"),
            ("搜索", "fa-search"),
            ("AI 对话", "fa-comments"),
            ("公司", "fa-building"),
            ("新玩法", "fa-magic"),
            ("我的作品", "fa-star"),
            ("编程", "fa-laptop-code"),
            ("投资", "fa-chart-line"),
            ("备用", "fa-archive"),
            ("政府网站", "fa-university"),
            ("MCP商店", "fa-store"),
            ("论文", "fa-graduation-cap"),
            ("艺术", "fa-palette"),
            ("汽车", "fa-car"),
            ("读看", "fa-book"),
        ];

        let colors = [
            ("AI 笔记", "#8b5cf6"),
            ("开发", "#10b981"),
            ("工具", "#f59e0b"),
            ("搜索", "#3b82f6"),
            ("AI 对话", "#ec4899"),
            ("公司", "#6b7280"),
            ("新玩法", "#14b8a6"),
            ("我的作品", "#f97316"),
            ("编程", "#0ea5e9"),
            ("投资", "#22c55e"),
            ("备用", "#94a3b8"),
            ("政府网站", "#dc2626"),
            ("MCP商店", "#a855f7"),
            ("论文", "#475569"),
            ("艺术", "#d946ef"),
            ("汽车", "#0891b2"),
            ("读看", "#eab308"),
        ];

        let tag_rules = vec![
            TagRule::new("ai", &["AI", "人工智能", "智能"]),
            TagRule::new("开发", &["开发", "Dev", "API", "SDK", "GitHub"]),
            TagRule::new("设计", &["设计", "Design", "UI", "UX", "Figma"]),
            TagRule::new("文档", &["文档", "Doc", "文档中心", "文档库"]),
            TagRule::new("工具", &["工具", "Tool", "工具箱", "在线工具"]),
            TagRule::new("管理", &["管理", "Manage", "系统", "平台"]),
            TagRule::new("学习", &["学习", "教程", "课程", "培训"]),
            TagRule::new("云服务", &["云", "Cloud", "服务器", "AWS", "阿里云", "腾讯云"]),
            TagRule::new("社交媒体", &["微信", "QQ", "社交媒体", "公众号"]),
            TagRule::new("新闻", &["新闻", "资讯", "News"]),
            TagRule::new("视频", &["视频", "Video", "YouTube", "B站"]),
            TagRule::new("购物", &["购物", "商城", "Shop"]),
            TagRule::new("金融", &["金融", "银行", "投资", "股票"]),
        ];

        Self {
            icons: icons.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            colors: colors.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            default_icon: "fa-folder".to_string(),
            default_color: "#6b7280".to_string(),
            tag_rules,
        }
    }
}

/// Keyword and lookup-table classifier
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    config: ClassifierConfig,
    // keywords lowercased once up front
    lowered_rules: Vec<(String, Vec<String>)>,
}

impl HeuristicClassifier {
    /// Create a classifier with the built-in tables
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with custom tables
    pub fn with_config(config: ClassifierConfig) -> Self {
        let lowered_rules = config
            .tag_rules
            .iter()
            .map(|rule| {
                let keywords = rule
                    .keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .map(|k| k.to_lowercase())
                    .collect();
                (rule.tag.clone(), keywords)
            })
            .collect();

        Self { config, lowered_rules }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Icon for a category name; exact match only
    pub fn icon_for(&self, category_name: &str) -> &str {
        self.config
            .icons
            .get(category_name)
            .map(String::as_str)
            .unwrap_or(self.config.default_icon.as_str())
    }

    /// Color for a category name; exact match only
    pub fn color_for(&self, category_name: &str) -> &str {
        self.config
            .colors
            .get(category_name)
            .map(String::as_str)
            .unwrap_or(self.config.default_color.as_str())
    }

    /// Tags whose keywords occur in the title or URL, ignoring case
    pub fn tags_for(&self, title: &str, url: &str) -> BTreeSet<String> {
        let title = title.to_lowercase();
        let url = url.to_lowercase();

        self.lowered_rules
            .iter()
            .filter(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|k| title.contains(k.as_str()) || url.contains(k.as_str()))
            })
            .map(|(tag, _)| tag.clone())
            .collect()
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new()
    }
}
