use std::collections::HashSet;
use std::fmt;

/// Category assigned to a discovered site
///
/// Variants are declared in classification priority order: when an item matches
/// several keyword sets the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SiteType {
    Gambling,
    IllegalPrivateServer,
    AdBannerHost,
    ChatInviteLink,
    Community,
    Unknown,
}

impl SiteType {
    /// Every variant, highest priority first
    pub const PRIORITY: [SiteType; 6] = [
        Self::Gambling,
        Self::IllegalPrivateServer,
        Self::AdBannerHost,
        Self::ChatInviteLink,
        Self::Community,
        Self::Unknown,
    ];

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Gambling => "GAMBLING",
            Self::IllegalPrivateServer => "ILLEGAL_PRIVATE_SERVER",
            Self::AdBannerHost => "AD_BANNER_HOST",
            Self::ChatInviteLink => "CHAT_INVITE_LINK",
            Self::Community => "COMMUNITY",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|t| t.to_db_string() == s)
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// What kind of link an extracted item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Website,
    CommunitySite,
    OpenChatLink,
    DiscordLink,
}

impl LinkType {
    pub const ALL: [LinkType; 4] = [
        Self::Website,
        Self::CommunitySite,
        Self::OpenChatLink,
        Self::DiscordLink,
    ];

    /// Chat invites are addressed by full URL rather than by domain
    pub fn is_chat_invite(&self) -> bool {
        matches!(self, Self::OpenChatLink | Self::DiscordLink)
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Website => "WEBSITE",
            Self::CommunitySite => "COMMUNITY_SITE",
            Self::OpenChatLink => "OPEN_CHAT_LINK",
            Self::DiscordLink => "DISCORD_LINK",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.to_db_string() == s)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// A classified site that is a candidate for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSiteRecord {
    pub url: String,

    /// Domain for websites, the full URL for chat invites
    pub normalized_identifier: String,

    pub site_type: SiteType,
    pub link_type: LinkType,
    pub site_name: Option<String>,

    /// Page the site was discovered on
    pub source_url: Option<String>,
}

/// Everything one page contributed to the frontier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub new_community_domains: HashSet<String>,
    pub new_target_sites: Vec<TargetSiteRecord>,
    pub new_keywords: HashSet<String>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.new_community_domains.is_empty()
            && self.new_target_sites.is_empty()
            && self.new_keywords.is_empty()
    }
}
