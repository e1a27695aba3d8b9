use regex::{Captures, Regex};

use promptmix_core::OverrideRule;

use crate::errors::EngineError;

/// Rewrite matching `名称：值` fragments in-place with override literals.
///
/// Each rule carries a budget: `count` combinations from the front of the
/// batch are rewritten (0 means all of them), the rest keep their sampled
/// value for that library.
pub fn apply_overrides(
    combinations: &mut [String],
    rules: &[OverrideRule],
) -> Result<(), EngineError> {
    for rule in rules {
        let pattern = format!(
            "(^|，){}：[^，]*",
            regex::escape(&rule.library)
        );
        let regex = Regex::new(&pattern)
            .map_err(|err| EngineError::InvalidConfig(format!("override pattern: {err}")))?;

        let budget = if rule.count == 0 {
            combinations.len()
        } else {
            rule.count.min(combinations.len())
        };

        for combination in combinations.iter_mut().take(budget) {
            let rewritten = regex.replace(combination, |caps: &Captures| {
                format!("{}{}：{}", &caps[1], rule.library, rule.value)
            });
            *combination = rewritten.into_owned();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(library: &str, value: &str, count: usize) -> OverrideRule {
        OverrideRule {
            library: library.to_string(),
            value: value.to_string(),
            count,
        }
    }

    fn batch() -> Vec<String> {
        vec![
            "场景：森林，风格：水彩".to_string(),
            "场景：海边，风格：写实".to_string(),
            "场景：沙漠，风格：素描".to_string(),
        ]
    }

    #[test]
    fn count_zero_rewrites_every_combination() {
        let mut combinations = batch();
        apply_overrides(&mut combinations, &[rule("场景", "山顶", 0)]).expect("apply override");

        for combination in &combinations {
            assert!(combination.starts_with("场景：山顶，"), "got {combination}");
        }
    }

    #[test]
    fn count_limits_the_budget_to_the_front_of_the_batch() {
        let mut combinations = batch();
        apply_overrides(&mut combinations, &[rule("风格", "油画", 2)]).expect("apply override");

        assert_eq!(combinations[0], "场景：森林，风格：油画");
        assert_eq!(combinations[1], "场景：海边，风格：油画");
        assert_eq!(combinations[2], "场景：沙漠，风格：素描");
    }

    #[test]
    fn non_leading_fragment_keeps_its_separator() {
        let mut combinations = vec!["场景：森林，风格：水彩".to_string()];
        apply_overrides(&mut combinations, &[rule("风格", "版画", 0)]).expect("apply override");
        assert_eq!(combinations[0], "场景：森林，风格：版画");
    }

    #[test]
    fn library_name_with_regex_metacharacters_is_escaped() {
        let mut combinations = vec!["维度(特殊)：值".to_string()];
        apply_overrides(&mut combinations, &[rule("维度(特殊)", "替换", 0)])
            .expect("apply override");
        assert_eq!(combinations[0], "维度(特殊)：替换");
    }

    #[test]
    fn override_value_containing_dollar_is_literal() {
        let mut combinations = vec!["价格：低".to_string()];
        apply_overrides(&mut combinations, &[rule("价格", "$100", 0)]).expect("apply override");
        assert_eq!(combinations[0], "价格：$100");
    }

    #[test]
    fn missing_library_leaves_combinations_untouched() {
        let mut combinations = batch();
        let original = combinations.clone();
        apply_overrides(&mut combinations, &[rule("不存在", "x", 0)]).expect("apply override");
        assert_eq!(combinations, original);
    }
}
