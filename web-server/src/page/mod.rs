use comicgen::config::KeyStatus;
use comicgen::imagegen::ServiceKind;
use comicgen::pipeline::ComicResult;

const INDEX_TEMPLATE: &str = include_str!("../../static/index.html");

// Values echoed back into the form
#[derive(Debug, Default)]
pub struct FormEcho {
    pub video_url: String,
    pub description: String,
}

pub struct IndexPage<'a> {
    pub keys: KeyStatus,
    pub primary: ServiceKind,
    pub fallback: ServiceKind,
    pub echo: &'a FormEcho,
    // pre-rendered, already escaped
    pub result: String,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // keeps template placeholders out of substituted text
            '{' => out.push_str("&#123;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_options(selected: ServiceKind) -> String {
    ServiceKind::ALL
        .iter()
        .map(|kind| {
            let sel = if *kind == selected { " selected" } else { "" };
            format!("<option value=\"{kind}\"{sel}>{kind}</option>")
        })
        .collect()
}

fn render_key_status(keys: KeyStatus) -> String {
    let line = |name: &str, ok: bool| {
        if ok {
            format!("<div class=\"success-box\">{name}: Configured</div>")
        } else {
            format!("<div class=\"error-box\">{name}: Not configured</div>")
        }
    };
    let mut out = line("OPENAI_API_KEY", keys.openai);
    out.push_str(&line("GEMINI_API_KEY", keys.gemini));
    if !keys.openai && !keys.gemini {
        out.push_str("<div class=\"warning-box\">Configure API keys in your .env file to use services</div>");
    }
    out
}

pub fn render_index(page: &IndexPage) -> String {
    INDEX_TEMPLATE
        .replace("{{KEY_STATUS}}", &render_key_status(page.keys))
        .replace("{{PRIMARY_OPTIONS}}", &render_options(page.primary))
        .replace("{{FALLBACK_OPTIONS}}", &render_options(page.fallback))
        .replace("{{VIDEO_URL}}", &escape_html(&page.echo.video_url))
        .replace("{{DESCRIPTION}}", &escape_html(&page.echo.description))
        .replace("{{RESULT}}", &page.result)
}

pub fn render_result(result: &ComicResult) -> String {
    let service = result.service_used;
    let mut out = String::from("<section class=\"comic\"><h3>Your Comic Strip</h3>");
    out.push_str(&format!(
        "<img src=\"{}\" alt=\"Generated comic strip\"><p class=\"caption\">Generated Comic Strip</p>",
        result.image.to_data_uri()
    ));
    out.push_str(&format!(
        "<span class=\"service-badge service-{service}\">Generated with {}</span>",
        service.label()
    ));
    if let Some(ref warning) = result.warning {
        out.push_str(&format!(
            "<div class=\"warning-box\">{}</div>",
            escape_html(warning)
        ));
    }
    out.push_str(&format!(
        "<details><summary>View Enhanced Prompt</summary><p>{}</p></details>",
        escape_html(&result.enhanced_prompt)
    ));
    out.push_str(&format!(
        "<a class=\"download\" href=\"{}\" download=\"comic_strip.png\">Download Comic</a></section>",
        result.image.to_data_uri()
    ));
    out
}

pub fn render_error(message: &str, tips: &[&str]) -> String {
    let mut out = format!("<div class=\"error-box\">{}</div>", escape_html(message));
    for tip in tips {
        out.push_str(&format!("<div class=\"tip-box\">Tip: {}</div>", escape_html(tip)));
    }
    out
}
