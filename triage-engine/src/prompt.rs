// ---------------------------------------------------------------------------
// Prompt templates
// ---------------------------------------------------------------------------
//
// One fixed template per locale, each with the same five logical
// sections: problem analysis, recommended solution, notes, reference
// cases, and a request for further diagnostics. Every device field is
// always present — missing values render as the locale's "Unknown"
// placeholder, never as a blank.
// ---------------------------------------------------------------------------

/// Device attributes supplied by the caller alongside the question.
#[derive(Debug, Clone, Default)]
pub struct DeviceContext {
    pub model_type: Option<String>,
    pub sw_version: Option<String>,
    pub components: Vec<String>,
    pub country: Option<String>,
}

/// Prompt template locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Zh,
}

impl Locale {
    pub fn parse(s: &str) -> Option<Locale> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "zh" => Some(Locale::Zh),
            _ => None,
        }
    }

    fn unknown(&self) -> &'static str {
        match self {
            Locale::En => "Unknown",
            Locale::Zh => "未知",
        }
    }

    fn no_prior_cases(&self) -> &'static str {
        match self {
            Locale::En => "(no relevant historical cases on record — say so in the analysis)",
            Locale::Zh => "（暂无相关历史案例——请在分析中说明）",
        }
    }
}

pub struct PromptTemplate {
    locale: Locale,
}

impl PromptTemplate {
    pub fn for_locale(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Substitute every field into the fixed template. All five sections
    /// are always present, even when no cases were retrieved.
    pub fn render(
        &self,
        question: &str,
        device: &DeviceContext,
        context: &str,
        references: &str,
    ) -> String {
        let unknown = self.locale.unknown();
        let or_unknown = |value: &Option<String>| -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v.trim().to_string(),
                _ => unknown.to_string(),
            }
        };

        let components = if device.components.is_empty() {
            unknown.to_string()
        } else {
            device.components.join(", ")
        };
        let context = if context.trim().is_empty() {
            self.locale.no_prior_cases().to_string()
        } else {
            context.to_string()
        };

        match self.locale {
            Locale::En => format!(
                "You are a professional technical support assistant. Please analyze the user's issue and provide recommendations.\n\
                \n\
                [Device Context]\n\
                - Software Version: {sw_version}\n\
                - Model Type: {model_type}\n\
                - Components: {components}\n\
                - Country: {country}\n\
                \n\
                [Relevant Historical Cases]\n\
                {context}\n\
                \n\
                [User's Problem]\n\
                \"{question}\"\n\
                \n\
                Please respond in the following format:\n\
                \n\
                🔍 **Problem Analysis**:\n\
                Briefly explain the possible root cause.\n\
                \n\
                🛠️ **Recommended Solution**:\n\
                1. Step-by-step actions.\n\
                2. If multiple, list clearly.\n\
                \n\
                📌 **Notes**:\n\
                - Remind to back up before firmware/software updates.\n\
                - Mention regulatory compliance if relevant.\n\
                \n\
                🔗 **Reference Cases**:\n\
                {references}\n\
                \n\
                ❓ **If More Info Needed**:\n\
                Suggest what logs or details to collect.\n",
                sw_version = or_unknown(&device.sw_version),
                model_type = or_unknown(&device.model_type),
                components = components,
                country = or_unknown(&device.country),
                context = context,
                question = question,
                references = references,
            ),
            Locale::Zh => format!(
                "你是一名专业的技术支持助理。请分析用户的问题并给出建议。\n\
                \n\
                【设备信息】\n\
                - 软件版本：{sw_version}\n\
                - 机型：{model_type}\n\
                - 相关组件：{components}\n\
                - 国家/地区：{country}\n\
                \n\
                【相关历史案例】\n\
                {context}\n\
                \n\
                【用户问题】\n\
                \"{question}\"\n\
                \n\
                请按以下格式回复：\n\
                \n\
                🔍 **问题分析**：\n\
                简要说明可能的根本原因。\n\
                \n\
                🛠️ **建议方案**：\n\
                1. 分步骤列出操作。\n\
                2. 如有多个方案，请分别列出。\n\
                \n\
                📌 **注意事项**：\n\
                - 提醒在固件/软件升级前先备份。\n\
                - 如涉及合规要求请说明。\n\
                \n\
                🔗 **参考案例**：\n\
                {references}\n\
                \n\
                ❓ **如需更多信息**：\n\
                说明需要收集哪些日志或细节。\n",
                sw_version = or_unknown(&device.sw_version),
                model_type = or_unknown(&device.model_type),
                components = components,
                country = or_unknown(&device.country),
                context = context,
                question = question,
                references = references,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN_SECTIONS: [&str; 5] = [
        "**Problem Analysis**",
        "**Recommended Solution**",
        "**Notes**",
        "**Reference Cases**",
        "**If More Info Needed**",
    ];

    fn full_device() -> DeviceContext {
        DeviceContext {
            model_type: Some("X300-Pro".to_string()),
            sw_version: Some("V2.3.1".to_string()),
            components: vec!["bootloader".to_string(), "wifi_driver".to_string()],
            country: Some("USA".to_string()),
        }
    }

    #[test]
    fn all_five_sections_are_always_present() {
        let template = PromptTemplate::for_locale(Locale::En);
        let rendered = template.render("boot loop", &full_device(), "", "");
        for section in EN_SECTIONS {
            assert!(rendered.contains(section), "missing section {}", section);
        }
    }

    #[test]
    fn missing_device_fields_render_as_unknown() {
        let template = PromptTemplate::for_locale(Locale::En);
        let rendered = template.render("boot loop", &DeviceContext::default(), "ctx", "refs");
        assert!(rendered.contains("- Software Version: Unknown"));
        assert!(rendered.contains("- Model Type: Unknown"));
        assert!(rendered.contains("- Components: Unknown"));
        assert!(rendered.contains("- Country: Unknown"));
    }

    #[test]
    fn present_fields_are_substituted() {
        let template = PromptTemplate::for_locale(Locale::En);
        let rendered = template.render("boot loop", &full_device(), "ctx", "refs");
        assert!(rendered.contains("- Model Type: X300-Pro"));
        assert!(rendered.contains("- Components: bootloader, wifi_driver"));
        assert!(rendered.contains("\"boot loop\""));
        assert!(rendered.contains("ctx"));
        assert!(rendered.contains("refs"));
    }

    #[test]
    fn empty_context_gets_the_no_prior_cases_marker() {
        let template = PromptTemplate::for_locale(Locale::En);
        let rendered = template.render("boot loop", &full_device(), "", "");
        assert!(rendered.contains("no relevant historical cases on record"));
    }

    #[test]
    fn zh_locale_renders_localized_sections_and_placeholder() {
        let template = PromptTemplate::for_locale(Locale::Zh);
        let rendered = template.render("无法开机", &DeviceContext::default(), "", "");
        assert!(rendered.contains("**问题分析**"));
        assert!(rendered.contains("**建议方案**"));
        assert!(rendered.contains("**注意事项**"));
        assert!(rendered.contains("**参考案例**"));
        assert!(rendered.contains("**如需更多信息**"));
        assert!(rendered.contains("未知"));
    }

    #[test]
    fn locale_parse_accepts_known_tags_only() {
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse(" ZH "), Some(Locale::Zh));
        assert_eq!(Locale::parse("fr"), None);
    }
}
