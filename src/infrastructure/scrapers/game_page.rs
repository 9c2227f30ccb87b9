use super::{alphanumeric, attr, element_text, first_text, parse_selector, PageScraper};
use crate::domain::{
    normalize_key, AggregateReview, GamePage, Language, MetaTag, PageLink, Requirement,
    SocialMedia,
};
use crate::error::{Result, SteamerError};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const LINK_FILTER_PREFIX: &str = "https://steamcommunity.com/linkfilter/";

static PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").unwrap());
static LABEL_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z]+").unwrap());

const RELEASE_DATE_FORMATS: [&str; 4] = ["%d %b, %Y", "%b %d, %Y", "%d %B, %Y", "%B %d, %Y"];

pub struct GamePageScraper {
    app_id: Selector,
    app_name: Selector,
    description: Selector,
    verbose: Selector,
    categories: Selector,
    developers: Selector,
    genres: Selector,
    publishers: Selector,
    tags: Selector,
    language_rows: Selector,
    cells: [Selector; 4],
    sys_req: Selector,
    req_minimum: Selector,
    req_recommended: Selector,
    req_list: Selector,
    req_item: Selector,
    strong: Selector,
    reviews_all: Selector,
    reviews_recent: Selector,
    review_summary: Selector,
    review_count: Selector,
    review_percentage: Selector,
    release_date: Selector,
    coming_soon: Selector,
    early_access: Selector,
    purchase: Selector,
    linkbar: Selector,
    meta: Selector,
    canonical: Selector,
}

impl GamePageScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            app_id: parse_selector("div[data-appid]")?,
            app_name: parse_selector("div.apphub_AppName")?,
            description: parse_selector("div.game_description_snippet")?,
            verbose: parse_selector("#game_area_description")?,
            categories: parse_selector("div.game_area_details_specs a.name")?,
            developers: parse_selector("#developers_list a")?,
            genres: parse_selector("div.game_details div.details_block:first-child > a")?,
            publishers: parse_selector("div.user_reviews div.dev_row .summary:not([id]) a")?,
            tags: parse_selector("a.app_tag")?,
            language_rows: parse_selector(r#"table.game_language_options tr[class=""]"#)?,
            cells: [
                parse_selector("td:nth-child(1)")?,
                parse_selector("td:nth-child(2)")?,
                parse_selector("td:nth-child(3)")?,
                parse_selector("td:nth-child(4)")?,
            ],
            sys_req: parse_selector("div.game_area_sys_req[data-os]")?,
            req_minimum: parse_selector(".game_area_sys_req_leftCol, .game_area_sys_req_full")?,
            req_recommended: parse_selector(".game_area_sys_req_rightCol")?,
            req_list: parse_selector("ul.bb_ul")?,
            req_item: parse_selector("li")?,
            strong: parse_selector("strong")?,
            reviews_all: parse_selector(".user_reviews_summary_row[itemprop]")?,
            reviews_recent: parse_selector(".user_reviews_summary_row:not([itemprop])")?,
            review_summary: parse_selector("span.game_review_summary")?,
            review_count: parse_selector("span.responsive_hidden")?,
            review_percentage: parse_selector("span.nonresponsive_hidden")?,
            release_date: parse_selector("div.release_date div.date")?,
            coming_soon: parse_selector("div.game_area_comingsoon")?,
            early_access: parse_selector("div.early_access_header")?,
            purchase: parse_selector("div.game_area_purchase_game")?,
            linkbar: parse_selector("a.linkbar[href]")?,
            meta: parse_selector("meta")?,
            canonical: parse_selector(r#"link[rel="canonical"]"#)?,
        })
    }

    fn links(&self, root: &ElementRef, selector: &Selector) -> Vec<PageLink> {
        root.select(selector)
            .map(|el| {
                let title = element_text(&el);
                PageLink {
                    name: normalize_key(&title),
                    title,
                    url: attr(&el, "href").unwrap_or_default(),
                }
            })
            .collect()
    }

    fn languages(&self, root: &ElementRef) -> Vec<Language> {
        root.select(&self.language_rows)
            .map(|row| {
                let [name, interface, audio, subtitles] =
                    self.cells.each_ref().map(|cell| first_text(&row, cell));
                Language {
                    name,
                    interface: !interface.is_empty(),
                    audio: !audio.is_empty(),
                    subtitles: !subtitles.is_empty(),
                }
            })
            .collect()
    }

    fn requirements(&self, root: &ElementRef, column: &Selector) -> Vec<Requirement> {
        let mut requirements = Vec::new();

        for block in root.select(&self.sys_req) {
            let Some(platform) = attr(&block, "data-os") else {
                continue;
            };
            let Some(col) = block.select(column).next() else {
                continue;
            };

            let mut requirement = Requirement {
                platform,
                ..Requirement::default()
            };
            if let Some(list) = col.select(&self.req_list).next() {
                for item in list.select(&self.req_item) {
                    let label = first_text(&item, &self.strong);
                    if label.is_empty() {
                        continue;
                    }
                    let key = LABEL_KEY.replace_all(&label, "").to_lowercase();
                    let value = element_text(&item)
                        .trim_start_matches(label.as_str())
                        .trim()
                        .to_string();
                    set_requirement_field(&mut requirement, &key, value);
                }
            }
            requirements.push(requirement);
        }

        requirements
    }

    fn review(&self, root: &ElementRef, row: &Selector) -> AggregateReview {
        let Some(row) = root.select(row).next() else {
            return AggregateReview::default();
        };

        let count = first_text(&row, &self.review_count)
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .unwrap_or(0);
        let percentage = PERCENTAGE
            .captures(&first_text(&row, &self.review_percentage))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);

        AggregateReview {
            count,
            percentage,
            sentiment: first_text(&row, &self.review_summary),
        }
    }

    /// Direct text children of the description block, without nested markup.
    fn verbose(&self, root: &ElementRef) -> String {
        root.select(&self.verbose)
            .next()
            .map(|el| {
                el.children()
                    .filter_map(|node| node.value().as_text())
                    .map(|text| text.trim())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// External links go through Steam's link filter. The one labelled as
    /// the website is returned separately from the social media links.
    fn external_links(&self, root: &ElementRef) -> (Option<String>, Vec<SocialMedia>) {
        let mut website = None;
        let mut social_media = Vec::new();

        for link in root.select(&self.linkbar) {
            let Some(href) = attr(&link, "href") else {
                continue;
            };
            if !href.starts_with(LINK_FILTER_PREFIX) {
                continue;
            }
            let Some(target) = url::Url::parse(&href).ok().and_then(|u| {
                u.query_pairs()
                    .find(|(key, _)| key == "url" || key == "u")
                    .map(|(_, value)| value.into_owned())
            }) else {
                continue;
            };

            if website.is_none() && element_text(&link).to_lowercase().contains("website") {
                website = Some(target);
                continue;
            }
            let name = url::Url::parse(&target)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();
            social_media.push(SocialMedia { name, url: target });
        }

        (website, social_media)
    }

    fn meta(&self, root: &ElementRef) -> Vec<MetaTag> {
        root.select(&self.meta)
            .map(|el| MetaTag {
                content: attr(&el, "content"),
                name: attr(&el, "name"),
                property: attr(&el, "property"),
            })
            .collect()
    }
}

fn set_requirement_field(requirement: &mut Requirement, key: &str, value: String) {
    let field = match key {
        "os" => &mut requirement.os,
        "processor" => &mut requirement.processor,
        "memory" => &mut requirement.memory,
        "graphics" => &mut requirement.graphics,
        "directx" => &mut requirement.directx,
        "network" => &mut requirement.network,
        "storage" | "harddrive" => &mut requirement.storage,
        "soundcard" => &mut requirement.soundcard,
        "additionalnotes" => &mut requirement.additional_notes,
        _ => return,
    };
    *field = value;
}

pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    RELEASE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

impl PageScraper for GamePageScraper {
    type Output = GamePage;

    fn scrape(&self, document: &Html, url: &str) -> Result<GamePage> {
        let root = document.root_element();

        let app_id = root
            .select(&self.app_id)
            .next()
            .and_then(|el| attr(&el, "data-appid"))
            .and_then(|id| id.parse::<u64>().ok())
            .ok_or_else(|| SteamerError::Parse(format!("no app id on game page {}", url)))?;

        let title = first_text(&root, &self.app_name);
        let mut name = alphanumeric(&title);
        if name.is_empty() {
            name = app_id.to_string();
        }

        let coming_soon = root.select(&self.coming_soon).next().is_some();
        let release_date_text = first_text(&root, &self.release_date);
        let (website, social_media) = self.external_links(&root);

        Ok(GamePage {
            app_id,
            name,
            title,
            description: first_text(&root, &self.description),
            verbose: self.verbose(&root),
            available: !coming_soon && root.select(&self.purchase).next().is_some(),
            coming_soon,
            early_access: root.select(&self.early_access).next().is_some(),
            categories: self.links(&root, &self.categories),
            developers: self.links(&root, &self.developers),
            genres: self.links(&root, &self.genres),
            publishers: self.links(&root, &self.publishers),
            tags: self.links(&root, &self.tags),
            languages: self.languages(&root),
            requirements_minimum: self.requirements(&root, &self.req_minimum),
            requirements_recommended: self.requirements(&root, &self.req_recommended),
            reviews_all: self.review(&root, &self.reviews_all),
            reviews_recent: self.review(&root, &self.reviews_recent),
            release_date: parse_release_date(&release_date_text),
            release_date_text,
            website,
            social_media,
            meta: self.meta(&root),
            timestamp: Utc::now(),
            url: root
                .select(&self.canonical)
                .next()
                .and_then(|el| attr(&el, "href"))
                .unwrap_or_else(|| url.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head>
  <meta property="og:title" content="Portal 2 on Steam">
  <meta name="description" content="The sequel to Portal.">
  <link rel="canonical" href="https://store.steampowered.com/app/620/Portal_2/">
</head>
<body>
  <div class="apphub_AppName">Portal 2</div>
  <div data-appid="620" class="queue_actions_ctn"></div>
  <div class="game_description_snippet">  The "Perpetual Testing Initiative" has been expanded. </div>
  <div class="user_reviews">
    <div class="user_reviews_summary_row" itemprop="aggregateRating">
      <span class="game_review_summary positive">Overwhelmingly Positive</span>
      <span class="responsive_hidden">(312,345)</span>
      <span class="nonresponsive_hidden responsive_reviewdesc">- 98% of the 312,345 user reviews for this game are positive.</span>
    </div>
    <div class="user_reviews_summary_row">
      <span class="game_review_summary positive">Very Positive</span>
      <span class="responsive_hidden">(1,024)</span>
      <span class="nonresponsive_hidden responsive_reviewdesc">- 94% of the 1,024 user reviews in the last 30 days are positive.</span>
    </div>
    <div class="release_date"><div class="date">18 Apr, 2011</div></div>
    <div class="dev_row">
      <div class="summary column" id="developers_list"><a href="https://store.steampowered.com/developer/valve">Valve</a></div>
    </div>
    <div class="dev_row">
      <div class="summary column"><a href="https://store.steampowered.com/publisher/valve">Valve</a></div>
    </div>
  </div>
  <a class="app_tag" href="https://store.steampowered.com/tags/en/Puzzle/">  Puzzle </a>
  <a class="app_tag" href="https://store.steampowered.com/tags/en/Co-op/">Co-op</a>
  <div class="game_area_purchase_game"><h1>Buy Portal 2</h1></div>
  <div id="game_area_description" class="game_area_description">
    <h2>About This Game</h2>Portal 2 draws from the award-winning formula.<br><b>Bold</b> more text.
  </div>
  <div class="game_area_details_specs"><a class="name" href="https://store.steampowered.com/search/?category2=2">Single-player</a></div>
  <div class="game_area_details_specs"><a class="name" href="https://store.steampowered.com/search/?category2=9">Co-op</a></div>
  <div class="game_details">
    <div class="details_block">
      <b>Genre:</b> <a href="https://store.steampowered.com/genre/Action/">Action</a>, <a href="https://store.steampowered.com/genre/Adventure/">Adventure</a>
    </div>
  </div>
  <a class="linkbar" href="https://steamcommunity.com/linkfilter/?u=http%3A%2F%2Fwww.thinkwithportals.com%2F">Visit the website</a>
  <a class="linkbar" href="https://steamcommunity.com/linkfilter/?u=https%3A%2F%2Ftwitter.com%2Fvalvesoftware">Twitter</a>
  <a class="linkbar" href="https://store.steampowered.com/news/?appids=620">Read related news</a>
  <table class="game_language_options">
    <tr><th></th><th>Interface</th><th>Full Audio</th><th>Subtitles</th></tr>
    <tr class="">
      <td class="ellipsis">English</td><td class="checkcol"><span>&#10004;</span></td><td class="checkcol"><span>&#10004;</span></td><td class="checkcol"><span>&#10004;</span></td>
    </tr>
    <tr class="">
      <td class="ellipsis">Czech</td><td class="checkcol"><span>&#10004;</span></td><td class="checkcol"></td><td class="checkcol"><span>&#10004;</span></td>
    </tr>
    <tr class="unsupported"><td>Klingon</td><td></td><td></td><td></td></tr>
  </table>
  <div class="game_area_sys_req sysreq_content active" data-os="win">
    <div class="game_area_sys_req_leftCol">
      <ul><strong>MINIMUM:</strong><br><ul class="bb_ul">
        <li><strong>OS:</strong> Windows 7<br></li>
        <li><strong>Processor:</strong> 3.0 GHz P4<br></li>
        <li><strong>Memory:</strong> 2 GB RAM<br></li>
        <li><strong>Hard Drive:</strong> 8 GB available space</li>
      </ul></ul>
    </div>
    <div class="game_area_sys_req_rightCol">
      <ul><strong>RECOMMENDED:</strong><br><ul class="bb_ul">
        <li><strong>Graphics:</strong> GeForce 7600<br></li>
        <li><strong>DirectX:</strong> Version 9.0c</li>
      </ul></ul>
    </div>
  </div>
  <div class="game_area_sys_req sysreq_content" data-os="linux">
    <div class="game_area_sys_req_full">
      <ul><ul class="bb_ul"><li><strong>OS:</strong> Ubuntu 12.04</li></ul></ul>
    </div>
  </div>
</body>
</html>
"#;

    fn scrape(html: &str) -> Result<GamePage> {
        let document = Html::parse_document(html);
        GamePageScraper::new()
            .unwrap()
            .scrape(&document, "https://store.steampowered.com/app/620/?snr=1_7_7")
    }

    #[test]
    fn scrapes_identity_and_text() {
        let page = scrape(GAME_PAGE).unwrap();

        assert_eq!(page.app_id, 620);
        assert_eq!(page.title, "Portal 2");
        assert_eq!(page.name, "Portal2");
        assert_eq!(
            page.description,
            r#"The "Perpetual Testing Initiative" has been expanded."#
        );
        assert_eq!(
            page.verbose,
            "Portal 2 draws from the award-winning formula.more text."
        );
        assert_eq!(page.url, "https://store.steampowered.com/app/620/Portal_2/");
        assert_eq!(page.release_date_text, "18 Apr, 2011");
        assert_eq!(page.release_date, NaiveDate::from_ymd_opt(2011, 4, 18));
        assert!(page.available);
        assert!(!page.coming_soon);
        assert!(!page.early_access);
    }

    #[test]
    fn scrapes_links() {
        let page = scrape(GAME_PAGE).unwrap();

        let tags: Vec<_> = page.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tags, vec!["PUZZLE", "CO-OP"]);
        assert_eq!(page.tags[0].title, "Puzzle");

        let categories: Vec<_> = page.categories.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(categories, vec!["Single-player", "Co-op"]);

        let genres: Vec<_> = page.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(genres, vec!["ACTION", "ADVENTURE"]);

        assert_eq!(page.developers.len(), 1);
        assert_eq!(page.developers[0].url, "https://store.steampowered.com/developer/valve");
        assert_eq!(page.publishers.len(), 1);
        assert_eq!(page.publishers[0].url, "https://store.steampowered.com/publisher/valve");
    }

    #[test]
    fn scrapes_reviews() {
        let page = scrape(GAME_PAGE).unwrap();

        assert_eq!(
            page.reviews_all,
            AggregateReview {
                count: 312345,
                percentage: 98,
                sentiment: "Overwhelmingly Positive".to_string(),
            }
        );
        assert_eq!(page.reviews_recent.count, 1024);
        assert_eq!(page.reviews_recent.percentage, 94);
        assert_eq!(page.reviews_recent.sentiment, "Very Positive");
    }

    #[test]
    fn scrapes_languages() {
        let page = scrape(GAME_PAGE).unwrap();

        assert_eq!(page.languages.len(), 2);
        assert_eq!(
            page.languages[1],
            Language {
                name: "Czech".to_string(),
                interface: true,
                audio: false,
                subtitles: true,
            }
        );
    }

    #[test]
    fn scrapes_requirements_per_platform() {
        let page = scrape(GAME_PAGE).unwrap();

        assert_eq!(page.requirements_minimum.len(), 2);
        let windows = &page.requirements_minimum[0];
        assert_eq!(windows.platform, "win");
        assert_eq!(windows.os, "Windows 7");
        assert_eq!(windows.processor, "3.0 GHz P4");
        assert_eq!(windows.memory, "2 GB RAM");
        assert_eq!(windows.storage, "8 GB available space");

        let linux = &page.requirements_minimum[1];
        assert_eq!(linux.platform, "linux");
        assert_eq!(linux.os, "Ubuntu 12.04");

        assert_eq!(page.requirements_recommended.len(), 1);
        assert_eq!(page.requirements_recommended[0].graphics, "GeForce 7600");
        assert_eq!(page.requirements_recommended[0].directx, "Version 9.0c");
    }

    #[test]
    fn splits_website_from_social_media() {
        let page = scrape(GAME_PAGE).unwrap();

        assert_eq!(page.website.as_deref(), Some("http://www.thinkwithportals.com/"));
        assert_eq!(
            page.social_media,
            vec![SocialMedia {
                name: "twitter.com".to_string(),
                url: "https://twitter.com/valvesoftware".to_string(),
            }]
        );
    }

    #[test]
    fn collects_meta_tags() {
        let page = scrape(GAME_PAGE).unwrap();

        assert!(page.meta.iter().any(|m| m.property.as_deref() == Some("og:title")
            && m.content.as_deref() == Some("Portal 2 on Steam")));
    }

    #[test]
    fn coming_soon_is_not_available() {
        let html = GAME_PAGE.replace(
            r#"<div class="game_area_purchase_game">"#,
            r#"<div class="game_area_comingsoon"></div><div class="game_area_purchase_game">"#,
        );
        let page = scrape(&html).unwrap();

        assert!(page.coming_soon);
        assert!(!page.available);
    }

    #[test]
    fn page_without_app_id_is_an_error() {
        let html = GAME_PAGE.replace(r#"data-appid="620""#, "");

        assert!(matches!(scrape(&html), Err(SteamerError::Parse(_))));
    }

    #[test]
    fn parses_release_date_formats() {
        assert_eq!(
            parse_release_date("4 Apr, 2014"),
            NaiveDate::from_ymd_opt(2014, 4, 4)
        );
        assert_eq!(
            parse_release_date("Apr 4, 2014"),
            NaiveDate::from_ymd_opt(2014, 4, 4)
        );
        assert_eq!(parse_release_date("Coming soon"), None);
    }
}
