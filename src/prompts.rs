use crate::models::AnalysisModule;

pub const LOCALIZATION: &str = include_str!("../data/prompts/localization.txt");
pub const CONTRACT_TASK: &str = include_str!("../data/prompts/contract_task.txt");
pub const SCAM_TASK: &str = include_str!("../data/prompts/scam_task.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Builds the full instruction text for one analysis run: the module's task
/// (with its expected JSON shape or verdict taxonomy) followed by the
/// localization directive. The result is appended to the request as the
/// trailing text part, after any file parts.
pub fn compose(
    module: AnalysisModule,
    language: &str,
    jurisdiction: &str,
    url_input: Option<&str>,
) -> String {
    let task = match module {
        AnalysisModule::Contract => render(
            CONTRACT_TASK,
            &[("language", language), ("jurisdiction", jurisdiction)],
        ),
        AnalysisModule::Scam => {
            let input = match url_input {
                Some(url) => format!("URL: \"{url}\""),
                None => "Image(s) provided for analysis.".to_string(),
            };
            render(
                SCAM_TASK,
                &[
                    ("language", language),
                    ("jurisdiction", jurisdiction),
                    ("input", &input),
                ],
            )
        }
    };

    let localization = render(LOCALIZATION, &[("language", language)]);
    format!("{task}\n{localization}")
}
