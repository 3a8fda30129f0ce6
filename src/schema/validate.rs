use super::{result_schema, SchemaNode};
use crate::error::GatewayError;
use crate::types::NormalizedResult;
use crate::Result;
use serde_json::Value;

/// 校验解析出的 JSON 并构造结果
///
/// 先按结构定义检查必填字段、数组长度和数值范围，再做类型化解码；
/// 任何一步失败都返回 SchemaError，不会返回部分结果。
pub fn validate(value: Value) -> Result<NormalizedResult> {
    check(result_schema(), &value, "$")?;
    serde_json::from_value(value).map_err(|e| GatewayError::schema(format!("字段类型不符: {}", e)))
}

fn check(node: &SchemaNode, value: &Value, path: &str) -> Result<()> {
    match node {
        SchemaNode::Object(fields) => {
            let object = value
                .as_object()
                .ok_or_else(|| GatewayError::schema(format!("{} 应为对象", path)))?;
            for field in fields {
                let child = object
                    .get(field.name)
                    .ok_or_else(|| GatewayError::schema(format!("缺少字段 {}.{}", path, field.name)))?;
                check(&field.node, child, &format!("{}.{}", path, field.name))?;
            }
            Ok(())
        }
        SchemaNode::Array { items, count, .. } => {
            let array = value
                .as_array()
                .ok_or_else(|| GatewayError::schema(format!("{} 应为数组", path)))?;
            if let Some(count) = count {
                if array.len() != *count {
                    return Err(GatewayError::schema(format!(
                        "{} 应包含 {} 项，实际 {} 项",
                        path,
                        count,
                        array.len()
                    )));
                }
            }
            for (i, item) in array.iter().enumerate() {
                check(items, item, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        // 字符串的宽松转换交给类型化解码
        SchemaNode::String { .. } => Ok(()),
        SchemaNode::Number { range, .. } => {
            let number = value
                .as_f64()
                .filter(|n| n.is_finite())
                .ok_or_else(|| GatewayError::schema(format!("{} 应为数字", path)))?;
            if let Some((min, max)) = range {
                if number < *min || number > *max {
                    return Err(GatewayError::schema(format!(
                        "{} 超出范围 [{}, {}]: {}",
                        path, min, max, number
                    )));
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recommendation(city: &str, score: f64) -> Value {
        json!({
            "city": city,
            "province": "广东",
            "tags": ["创新之都", "海滨"],
            "reason": "火土相生",
            "score": score,
            "distance": 120,
            "dimensions": {
                "career": 90,
                "wealth": 88,
                "relationship": 75,
                "health": 80,
                "environment": 85
            }
        })
    }

    fn valid_result() -> Value {
        json!({
            "bazi": {"year": "戊寅", "month": "庚申", "day": "丙午", "hour": "乙未"},
            "profile": {
                "wuxing": "火",
                "archetype": "山头火·璀璨",
                "keywords": "天生领袖 / 财运亨通",
                "luckyColor": "赤红",
                "luckyNumber": "9",
                "luckyDirection": "正南",
                "advice": "向南而行"
            },
            "recommendations": [
                recommendation("深圳", 95.0),
                recommendation("广州", 88.0),
                recommendation("厦门", 82.5)
            ]
        })
    }

    #[test]
    fn test_valid_result() {
        let result = validate(valid_result()).unwrap();
        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(result.bazi.year, "戊寅");
        assert_eq!(result.recommendations[2].score, 82.5);
    }

    #[test]
    fn test_missing_top_level_key() {
        for key in ["bazi", "profile", "recommendations"] {
            let mut value = valid_result();
            value.as_object_mut().unwrap().remove(key);
            let err = validate(value).unwrap_err();
            assert!(matches!(err, GatewayError::SchemaError(_)));
            assert!(err.to_string().contains(key));
            assert_eq!(err.http_status(), 502);
        }
    }

    #[test]
    fn test_recommendations_must_be_array() {
        let mut value = valid_result();
        value["recommendations"] = json!({"city": "深圳"});
        let err = validate(value).unwrap_err();
        assert!(err.to_string().contains("应为数组"));
    }

    #[test]
    fn test_wrong_recommendation_count() {
        let mut value = valid_result();
        value["recommendations"].as_array_mut().unwrap().pop();
        assert!(validate(value).is_err());

        let mut value = valid_result();
        value["recommendations"]
            .as_array_mut()
            .unwrap()
            .push(recommendation("杭州", 70.0));
        assert!(validate(value).is_err());
    }

    #[test]
    fn test_score_out_of_range() {
        let mut value = valid_result();
        value["recommendations"][1]["score"] = json!(101);
        let err = validate(value).unwrap_err();
        assert!(err.to_string().contains("$.recommendations[1].score"));

        let mut value = valid_result();
        value["recommendations"][0]["dimensions"]["health"] = json!(-1);
        assert!(validate(value).is_err());
    }

    #[test]
    fn test_number_given_as_string() {
        let mut value = valid_result();
        value["recommendations"][0]["score"] = json!("95");
        assert!(validate(value).is_err());
    }

    #[test]
    fn test_nested_type_mismatch() {
        let mut value = valid_result();
        value["recommendations"][0]["tags"] = json!([1, 2]);
        let err = validate(value).unwrap_err();
        assert!(matches!(err, GatewayError::SchemaError(_)));
    }

    #[test]
    fn test_oversized_field_error_is_bounded() {
        let mut value = valid_result();
        value["bazi"]["year"] = json!({"blob": "U".repeat(5000)});
        let err = validate(value).unwrap_err();
        assert!(matches!(err, GatewayError::SchemaError(_)));
        assert!(err.to_string().chars().count() < 150);
    }

    #[test]
    fn test_not_an_object() {
        assert!(validate(json!([1, 2, 3])).is_err());
        assert!(validate(json!("text")).is_err());
    }
}
