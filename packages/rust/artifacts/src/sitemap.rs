//! `sitemap.xml` generation.

use std::io::Cursor;

use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use folio_document::Document;
use folio_shared::{FolioError, Result};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Post dates are hand-typed; these are tried in order.
const POST_DATE_FORMATS: [&str; 2] = ["%B %d, %Y", "%Y-%m-%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Monthly,
}

impl ChangeFreq {
    fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: Option<ChangeFreq>,
    pub priority: f32,
}

/// Site URL without trailing slashes. Fails when unset.
pub fn base_url(doc: &Document) -> Result<&str> {
    let url = doc.site.url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(FolioError::ArtifactGeneration(
            "site.url is empty; set it before generating the site map".into(),
        ));
    }
    Ok(url)
}

/// Parse a post's free-form date. `None` when no known format matches.
pub fn parse_post_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    POST_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Entries in site-map order: home, about, external pages, posts.
pub fn sitemap_entries(doc: &Document, today: NaiveDate) -> Result<Vec<SitemapEntry>> {
    let base = base_url(doc)?;
    let mut entries = vec![
        SitemapEntry {
            loc: format!("{base}/"),
            lastmod: today,
            changefreq: Some(ChangeFreq::Daily),
            priority: 1.0,
        },
        SitemapEntry {
            loc: format!("{base}/about"),
            lastmod: today,
            changefreq: Some(ChangeFreq::Monthly),
            priority: 0.8,
        },
    ];

    for link in doc.site.external.iter().filter(|l| !l.url.is_empty()) {
        let sep = if link.url.starts_with('/') { "" } else { "/" };
        entries.push(SitemapEntry {
            loc: format!("{base}{sep}{}", link.url),
            lastmod: today,
            changefreq: Some(ChangeFreq::Monthly),
            priority: 0.8,
        });
    }

    for post in doc.blog.posts.iter().filter(|p| !p.id.is_empty()) {
        entries.push(SitemapEntry {
            loc: format!("{base}/post/{}", post.id),
            lastmod: parse_post_date(&post.date).unwrap_or(today),
            changefreq: None,
            priority: 0.7,
        });
    }

    Ok(entries)
}

/// Render entries as a sitemaps.org `urlset` document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    write(&mut writer, Event::Start(urlset))?;

    for entry in entries {
        write(&mut writer, Event::Start(BytesStart::new("url")))?;
        // BytesText escapes XML entities
        text_element(&mut writer, "loc", &entry.loc)?;
        text_element(&mut writer, "lastmod", &entry.lastmod.format("%Y-%m-%d").to_string())?;
        if let Some(freq) = entry.changefreq {
            text_element(&mut writer, "changefreq", freq.as_str())?;
        }
        text_element(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        write(&mut writer, Event::End(BytesEnd::new("url")))?;
    }
    write(&mut writer, Event::End(BytesEnd::new("urlset")))?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| FolioError::ArtifactGeneration(format!("sitemap is not UTF-8: {e}")))
}

/// Build the complete `sitemap.xml` text.
pub fn generate_sitemap(doc: &Document, today: NaiveDate) -> Result<String> {
    render_sitemap(&sitemap_entries(doc, today)?)
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| FolioError::ArtifactGeneration(format!("sitemap XML: {e}")))
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}
