use crate::schema::{result_schema, to_prompt_template};
use crate::types::BirthInput;

/// 固定的用户轮次
pub const USER_TURN: &str = "请为我批算八字，并推荐转运城市。";

const PERSONA: &str = "你是一个精通《三命通会》与《穷通宝鉴》的玄学大师，同时也是一位熟悉中国城市地理的数据分析师。";

fn task_line(input: &BirthInput) -> String {
    format!(
        "请根据用户的八字信息（{} {} 出生于 {}），推算其命理格局，并推荐最适合其发展的中国城市。",
        input.birth_date, input.birth_time, input.birth_place
    )
}

/// REST 聊天接口的系统提示词，内嵌完整的 JSON 模板
pub fn rest_chat_system_prompt(input: &BirthInput) -> String {
    format!(
        "{}\n{}\n\n请严格按照下方的 JSON 格式输出结果，不要输出任何 Markdown 标记（如 ```json）：\n\n{}\n",
        PERSONA,
        task_line(input),
        to_prompt_template(result_schema())
    )
}

/// 结构化输出的系统指令，结构由 responseSchema 约束，不再重复模板
pub fn structured_system_instruction(input: &BirthInput) -> String {
    format!(
        "{}\n{}\n推荐城市共 3 个，所有评分取 0-100 之间的数值。",
        PERSONA,
        task_line(input)
    )
}
