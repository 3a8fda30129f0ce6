//! 结果结构的唯一定义。
//!
//! 提示词中的 JSON 模板、Gemini 的 `responseSchema` 以及返回结果的校验都从
//! [`result_schema`] 派生，避免多处手写的结构互相漂移。

pub mod render;
pub mod validate;

pub use render::{to_prompt_template, to_response_schema};
pub use validate::validate;

use once_cell::sync::Lazy;

/// 推荐城市的固定数量
pub const RECOMMENDATION_COUNT: usize = 3;

/// 评分与各维度的取值范围
pub const SCORE_RANGE: (f64, f64) = (0.0, 100.0);

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object(Vec<Field>),
    Array {
        items: Box<SchemaNode>,
        /// 固定长度，None 表示不限
        count: Option<usize>,
        note: &'static str,
    },
    String {
        example: &'static str,
        description: &'static str,
    },
    Number {
        example: i64,
        description: &'static str,
        range: Option<(f64, f64)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub node: SchemaNode,
}

impl Field {
    fn new(name: &'static str, node: SchemaNode) -> Self {
        Self { name, node }
    }
}

fn string(example: &'static str, description: &'static str) -> SchemaNode {
    SchemaNode::String {
        example,
        description,
    }
}

fn number(example: i64, description: &'static str) -> SchemaNode {
    SchemaNode::Number {
        example,
        description,
        range: None,
    }
}

fn score(example: i64, description: &'static str) -> SchemaNode {
    SchemaNode::Number {
        example,
        description,
        range: Some(SCORE_RANGE),
    }
}

static RESULT_SCHEMA: Lazy<SchemaNode> = Lazy::new(build_result_schema);

/// 命理结果的结构定义
pub fn result_schema() -> &'static SchemaNode {
    &RESULT_SCHEMA
}

fn build_result_schema() -> SchemaNode {
    let bazi = SchemaNode::Object(vec![
        Field::new("year", string("甲子", "年份干支")),
        Field::new("month", string("丙寅", "月份干支")),
        Field::new("day", string("戊辰", "日期干支")),
        Field::new("hour", string("壬戌", "时辰干支")),
    ]);

    let profile = SchemaNode::Object(vec![
        Field::new("wuxing", string("火", "核心五行")),
        Field::new("archetype", string("山头火·璀璨", "五行意象")),
        Field::new("keywords", string("天生领袖 / 财运亨通", "2-3个性格关键词")),
        Field::new("luckyColor", string("赤红", "幸运色")),
        Field::new("luckyNumber", string("9", "幸运数字")),
        Field::new("luckyDirection", string("正南", "幸运方位")),
        Field::new("advice", string("向南而行，贵人自来", "一句简短有力的开运建议，少于20字")),
    ]);

    let dimensions = SchemaNode::Object(vec![
        Field::new("career", score(90, "事业")),
        Field::new("wealth", score(90, "财富")),
        Field::new("relationship", score(80, "感情")),
        Field::new("health", score(80, "健康")),
        Field::new("environment", score(80, "环境")),
    ]);

    let recommendation = SchemaNode::Object(vec![
        Field::new("city", string("深圳", "城市名")),
        Field::new("province", string("广东", "省份")),
        Field::new(
            "tags",
            SchemaNode::Array {
                items: Box::new(string("创新之都", "城市标签")),
                count: None,
                note: "2-3个标签",
            },
        ),
        Field::new("reason", string("火土相生，利于事业突破", "极其精简的推荐理由，直击痛点，少于30字")),
        Field::new("score", score(95, "0-100的契合度")),
        Field::new("distance", number(1200, "距离出生地的大致公里数")),
        Field::new("dimensions", dimensions),
    ]);

    SchemaNode::Object(vec![
        Field::new("bazi", bazi),
        Field::new("profile", profile),
        Field::new(
            "recommendations",
            SchemaNode::Array {
                items: Box::new(recommendation),
                count: Some(RECOMMENDATION_COUNT),
                note: "请提供总共 3 个推荐城市",
            },
        ),
    ])
}

impl SchemaNode {
    /// 对象节点的字段名
    pub fn field_names(&self) -> Vec<&'static str> {
        match self {
            SchemaNode::Object(fields) => fields.iter().map(|f| f.name).collect(),
            _ => Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Object(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.node),
            _ => None,
        }
    }
}
