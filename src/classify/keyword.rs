use crate::classify::types::{Classification, LinkType, SiteType, TargetSiteRecord};
use crate::classify::ResultClassifier;
use crate::config::ClassifierConfig;
use crate::fetch::{ExtractedItem, PageExtraction};
use crate::url::{matches_any, normalize_domain, parse_lenient};
use std::collections::HashSet;
use url::Url;

/// Splits a description into lowercase search keywords of two or more characters
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| word.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Classifier driven by configured indicator keyword lists and host patterns
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    gambling: Vec<String>,
    illegal_server: Vec<String>,
    ad_banner: Vec<String>,
    chat_invite: Vec<String>,
    community: Vec<String>,
    chat_invite_hosts: Vec<String>,
    community_hosts: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            gambling: lowered(&config.gambling_indicators),
            illegal_server: lowered(&config.illegal_server_indicators),
            ad_banner: lowered(&config.ad_banner_indicators),
            chat_invite: lowered(&config.chat_invite_indicators),
            community: lowered(&config.community_indicators),
            chat_invite_hosts: lowered(&config.chat_invite_hosts),
            community_hosts: lowered(&config.community_hosts),
        }
    }

    /// Decides the site type of an item
    ///
    /// Keyword sets are checked strictly in priority order and the first hit
    /// returns; the link type only breaks ties below the keyword-driven types.
    pub fn site_type(&self, title: &str, description: &str, link_type: LinkType) -> SiteType {
        let haystack = format!("{} {}", title, description).to_lowercase();
        let hit = |indicators: &[String]| indicators.iter().any(|i| haystack.contains(i.as_str()));

        if hit(&self.gambling) {
            return SiteType::Gambling;
        }
        if hit(&self.illegal_server) {
            return SiteType::IllegalPrivateServer;
        }
        if hit(&self.ad_banner) {
            return SiteType::AdBannerHost;
        }
        if link_type.is_chat_invite() || hit(&self.chat_invite) {
            return SiteType::ChatInviteLink;
        }
        if link_type == LinkType::CommunitySite || hit(&self.community) {
            return SiteType::Community;
        }
        SiteType::Unknown
    }

    /// Infers the link type of an item that arrived without one
    pub fn infer_link_type(&self, url: &Url) -> LinkType {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        if matches_any(&self.chat_invite_hosts, host) {
            if host.contains("discord") {
                LinkType::DiscordLink
            } else {
                LinkType::OpenChatLink
            }
        } else if matches_any(&self.community_hosts, host)
            || url.path().contains("/board/")
            || url.path().contains("/bbs/")
        {
            LinkType::CommunitySite
        } else {
            LinkType::Website
        }
    }

    fn classify_item(
        &self,
        item: &ExtractedItem,
        source_url: &str,
        source_domain: &str,
        out: &mut Classification,
        seen_targets: &mut HashSet<String>,
    ) {
        out.new_keywords.extend(extract_keywords(&item.description));

        let Some(raw_url) = item.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
            return;
        };
        let Some(url) = parse_lenient(raw_url) else {
            tracing::trace!("Skipping unparseable link {}", raw_url);
            return;
        };

        let link_type = item.link_type.unwrap_or_else(|| self.infer_link_type(&url));
        let title = item.title.as_deref().unwrap_or_default();
        let site_type = self.site_type(title, &item.description, link_type);
        let domain = normalize_domain(raw_url);

        if link_type == LinkType::CommunitySite
            || (link_type == LinkType::Website && site_type == SiteType::Community)
        {
            if !domain.is_empty() {
                out.new_community_domains.insert(domain);
            }
            return;
        }

        let identifier = if link_type.is_chat_invite() {
            raw_url.to_string()
        } else {
            if domain.is_empty() || domain == source_domain || site_type == SiteType::Unknown {
                return;
            }
            domain
        };

        if !seen_targets.insert(identifier.clone()) {
            return;
        }

        out.new_target_sites.push(TargetSiteRecord {
            url: raw_url.to_string(),
            normalized_identifier: identifier,
            site_type,
            link_type,
            site_name: item
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            source_url: Some(source_url.to_string()).filter(|s| !s.is_empty()),
        });
    }
}

impl ResultClassifier for KeywordClassifier {
    fn classify(&self, page: &PageExtraction, source_url: &str) -> Classification {
        let mut out = Classification::default();
        let mut seen_targets = HashSet::new();
        let source_domain = normalize_domain(if page.url.is_empty() {
            source_url
        } else {
            page.url.as_str()
        });

        for item in &page.items {
            self.classify_item(item, source_url, &source_domain, &mut out, &mut seen_targets);
        }

        out
    }
}

fn lowered(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
