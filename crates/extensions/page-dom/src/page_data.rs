//! Page data extraction and analysis.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::document::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub href: String,
    pub text: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    pub value: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInfo {
    pub action: String,
    pub method: String,
    pub inputs: Vec<FormInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub viewport: String,
}

/// Snapshot of a page's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub text: String,
    pub text_length: usize,
    pub element_count: usize,
    pub image_count: usize,
    pub link_count: usize,
    pub form_count: usize,
    pub images: Vec<ImageInfo>,
    pub links: Vec<LinkInfo>,
    pub forms: Vec<FormInfo>,
    pub meta: MetaInfo,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub headings: HeadingCounts,
    pub sections: usize,
    pub articles: usize,
    pub navs: usize,
    pub asides: usize,
    pub footers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessibility {
    pub images_without_alt: usize,
    pub links_without_text: usize,
    pub headings_without_text: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub title_length: usize,
    pub meta_description_length: usize,
    pub has_h1: bool,
    pub has_meta_description: bool,
    pub has_meta_keywords: bool,
}

/// [`PageData`] plus structural, accessibility and SEO findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    #[serde(flatten)]
    pub data: PageData,
    pub structure: Structure,
    pub accessibility: Accessibility,
    pub seo: Seo,
}

/// Element counts by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    pub element_count: usize,
    pub text_length: usize,
    pub image_count: usize,
    pub link_count: usize,
    pub form_count: usize,
    pub script_count: usize,
    pub style_count: usize,
    pub iframe_count: usize,
    pub video_count: usize,
    pub audio_count: usize,
    pub canvas_count: usize,
    pub svg_count: usize,
}

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

impl Document {
    fn attr_or_empty(&self, id: NodeId, name: &str) -> String {
        self.get_attribute(id, name).unwrap_or_default()
    }

    /// Resolve a possibly relative reference against the document URL.
    pub fn resolve_url(&self, reference: &str) -> String {
        match Url::parse(self.url()) {
            Ok(base) => base
                .join(reference)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| reference.to_string()),
            Err(_) => reference.to_string(),
        }
    }

    /// Host part of the document URL, empty when it has none.
    pub fn domain(&self) -> String {
        Url::parse(self.url())
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// `a` and `area` elements carrying an `href`.
    pub fn links(&self) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&n| {
                matches!(self.tag(n), Some("a") | Some("area"))
                    && self.get_attribute(n, "href").is_some()
            })
            .collect()
    }

    fn meta_content(&self, name: &str) -> String {
        self.elements_by_tag("meta")
            .into_iter()
            .find(|&m| self.get_attribute(m, "name").as_deref() == Some(name))
            .map(|m| self.attr_or_empty(m, "content"))
            .unwrap_or_default()
    }

    fn form_input(&self, id: NodeId) -> FormInput {
        let input_type = match self.tag(id) {
            Some("textarea") => "textarea".to_string(),
            Some("select") => "select-one".to_string(),
            Some("button") => self
                .get_attribute(id, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "submit".to_string()),
            _ => self
                .get_attribute(id, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        };
        FormInput {
            name: self.attr_or_empty(id, "name"),
            input_type,
            value: self.value(id).unwrap_or_default(),
            placeholder: self.attr_or_empty(id, "placeholder"),
        }
    }

    fn form_info(&self, form: NodeId) -> FormInfo {
        let action = match self.get_attribute(form, "action") {
            Some(action) => self.resolve_url(&action),
            None => self.url().to_string(),
        };
        let method = self
            .get_attribute(form, "method")
            .map(|m| m.to_ascii_lowercase())
            .filter(|m| m == "post" || m == "dialog")
            .unwrap_or_else(|| "get".to_string());
        let inputs = self
            .descendants(form)
            .into_iter()
            .filter(|&n| {
                matches!(
                    self.tag(n),
                    Some("input") | Some("select") | Some("textarea") | Some("button")
                )
            })
            .map(|n| self.form_input(n))
            .collect();
        FormInfo {
            action,
            method,
            inputs,
        }
    }

    pub fn extract_page_data(&self) -> PageData {
        let text = self.inner_text(self.body());
        let images: Vec<ImageInfo> = self
            .elements_by_tag("img")
            .into_iter()
            .map(|img| ImageInfo {
                src: self
                    .get_attribute(img, "src")
                    .map(|s| self.resolve_url(&s))
                    .unwrap_or_default(),
                alt: self.attr_or_empty(img, "alt"),
                width: self.attr_or_empty(img, "width").parse().unwrap_or(0),
                height: self.attr_or_empty(img, "height").parse().unwrap_or(0),
            })
            .collect();
        let links: Vec<LinkInfo> = self
            .links()
            .into_iter()
            .map(|a| LinkInfo {
                href: self.resolve_url(&self.attr_or_empty(a, "href")),
                text: self.text_content(a),
                title: self.attr_or_empty(a, "title"),
            })
            .collect();
        let forms: Vec<FormInfo> = self
            .elements_by_tag("form")
            .into_iter()
            .map(|f| self.form_info(f))
            .collect();

        PageData {
            title: self.title().to_string(),
            url: self.url().to_string(),
            domain: self.domain(),
            text_length: text.chars().count(),
            text,
            element_count: self.elements().len(),
            image_count: images.len(),
            link_count: links.len(),
            form_count: forms.len(),
            images,
            links,
            forms,
            meta: MetaInfo {
                description: self.meta_content("description"),
                keywords: self.meta_content("keywords"),
                author: self.meta_content("author"),
                viewport: self.meta_content("viewport"),
            },
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn analyze_page(&self) -> PageAnalysis {
        let data = self.extract_page_data();
        let count = |tag: &str| self.elements_by_tag(tag).len();

        let structure = Structure {
            headings: HeadingCounts {
                h1: count("h1"),
                h2: count("h2"),
                h3: count("h3"),
                h4: count("h4"),
                h5: count("h5"),
                h6: count("h6"),
            },
            sections: count("section"),
            articles: count("article"),
            navs: count("nav"),
            asides: count("aside"),
            footers: count("footer"),
        };

        let accessibility = Accessibility {
            images_without_alt: data.images.iter().filter(|i| i.alt.is_empty()).count(),
            links_without_text: data.links.iter().filter(|l| l.text.trim().is_empty()).count(),
            headings_without_text: self
                .elements()
                .into_iter()
                .filter(|&n| self.tag(n).is_some_and(|t| HEADING_TAGS.contains(&t)))
                .filter(|&n| self.text_content(n).trim().is_empty())
                .count(),
        };

        let seo = Seo {
            title_length: self.title().chars().count(),
            meta_description_length: data.meta.description.chars().count(),
            has_h1: structure.headings.h1 > 0,
            has_meta_description: !data.meta.description.is_empty(),
            has_meta_keywords: !data.meta.keywords.is_empty(),
        };

        PageAnalysis {
            data,
            structure,
            accessibility,
            seo,
        }
    }

    pub fn page_stats(&self) -> PageStats {
        let count = |tag: &str| self.elements_by_tag(tag).len();
        let stylesheets = self
            .elements_by_tag("link")
            .into_iter()
            .filter(|&l| {
                self.get_attribute(l, "rel")
                    .is_some_and(|r| r.eq_ignore_ascii_case("stylesheet"))
            })
            .count();
        PageStats {
            element_count: self.elements().len(),
            text_length: self.inner_text(self.body()).chars().count(),
            image_count: count("img"),
            link_count: self.links().len(),
            form_count: count("form"),
            script_count: count("script"),
            style_count: count("style") + stylesheets,
            iframe_count: count("iframe"),
            video_count: count("video"),
            audio_count: count("audio"),
            canvas_count: count("canvas"),
            svg_count: count("svg"),
        }
    }
}
