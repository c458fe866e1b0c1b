//! 声明式的字段校验规则

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("email pattern compiles")
});

#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    String,
    Number,
    MinLen(usize, &'static str),
    Email,
    NonNegative,
}

/// 校验结果
#[derive(Debug)]
pub enum Validated<T> {
    Valid(T),
    Invalid(Vec<String>),
}

impl<T> Validated<T> {
    pub fn into_result(self) -> Result<T, Vec<String>> {
        match self {
            Validated::Valid(value) => Ok(value),
            Validated::Invalid(messages) => Err(messages),
        }
    }
}

#[derive(Debug, Default)]
pub struct Schema {
    fields: Vec<(&'static str, Vec<Rule>)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name, rules.into_iter().collect()));
        self
    }

    /// 检查全部字段，收集每一条违反的规则
    pub fn validate(&self, input: &Value) -> Validated<Map<String, Value>> {
        let Some(object) = input.as_object() else {
            return Validated::Invalid(vec!["Request body must be a JSON object".into()]);
        };

        let mut messages = Vec::new();
        let mut parsed = Map::new();

        for (name, rules) in &self.fields {
            let value = object.get(*name).filter(|v| !v.is_null());
            let field_errors = check_field(name, value, rules);
            if field_errors.is_empty() {
                if let Some(v) = value {
                    parsed.insert((*name).to_string(), v.clone());
                }
            } else {
                messages.extend(field_errors);
            }
        }

        if messages.is_empty() {
            Validated::Valid(parsed)
        } else {
            Validated::Invalid(messages)
        }
    }

    /// 校验后反序列化为具体类型
    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> Validated<T> {
        match self.validate(input) {
            Validated::Valid(map) => match serde_json::from_value(Value::Object(map)) {
                Ok(value) => Validated::Valid(value),
                Err(e) => Validated::Invalid(vec![e.to_string()]),
            },
            Validated::Invalid(messages) => Validated::Invalid(messages),
        }
    }
}

fn check_field(name: &str, value: Option<&Value>, rules: &[Rule]) -> Vec<String> {
    let Some(value) = value else {
        return if rules.iter().any(|r| matches!(r, Rule::Required)) {
            vec![format!("{} is required", name)]
        } else {
            Vec::new()
        };
    };

    let mut errors = Vec::new();
    for rule in rules {
        match rule {
            Rule::Required => {}
            Rule::String => {
                if !value.is_string() {
                    // 类型不对时其余规则无意义
                    return vec![format!("{} must be a string", name)];
                }
            }
            Rule::Number => {
                if as_number(value).is_none() {
                    return vec![format!("{} must be a number", name)];
                }
            }
            Rule::MinLen(min, message) => {
                if value.as_str().is_some_and(|s| s.chars().count() < *min) {
                    errors.push((*message).to_string());
                }
            }
            Rule::Email => {
                if value.as_str().is_some_and(|s| !is_email(s)) {
                    errors.push("Invalid email".to_string());
                }
            }
            Rule::NonNegative => {
                if as_number(value).is_some_and(|n| n < 0.0) {
                    errors.push(format!("{} must not be negative", name));
                }
            }
        }
    }
    errors
}

/// 表单字段以字符串形式到达，数字规则同时接受数字和可解析的字符串
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}
