/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.

// Input defaults
pub const DEFAULT_CONFIG_FILE: &str = "m3u-aggregator.toml";
pub const DEFAULT_TEMPLATE_PATH: &str = "config/iptv.txt";

// Fetch defaults
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;
pub const DEFAULT_USER_AGENT: &str = concat!("m3u-aggregator/", env!("CARGO_PKG_VERSION"));

// Output defaults
pub const DEFAULT_M3U_OUTPUT: &str = "lib/iptv.m3u";
pub const DEFAULT_TXT_OUTPUT: &str = "lib/iptv.txt";
pub const DEFAULT_LINE_LABEL: &str = "line";
pub const DEFAULT_EPG_URL: &str = "";

/// Playlists aggregated when the configuration file does not list its own.
/// Blank entries are allowed and skipped.
pub const DEFAULT_SOURCES: &[&str] = &[
    "https://qu.ax/vUBde.txt",
    "https://m3u.ibert.me/fmml_ipv6.m3u",
    "https://raw.githubusercontent.com/Guovin/iptv-api/refs/heads/gd/output/result.m3u",
    "https://raw.githubusercontent.com/zwc456baby/iptv_alive/master/live.m3u",
    "https://raw.githubusercontent.com/BurningC4/Chinese-IPTV/master/TV-IPV4.m3u",
    "https://raw.githubusercontent.com/Wirili/IPTV/refs/heads/main/live.m3u",
    "https://raw.githubusercontent.com/wwb521/live/refs/heads/main/tv.m3u",
    "https://raw.githubusercontent.com/Kimentanm/aptv/master/m3u/iptv.m3u",
    "https://live.zbds.top/tv/iptv4.m3u",
    "https://live.zbds.top/tv/iptv6.m3u",
    "https://raw.githubusercontent.com/wind005/TVlive/refs/heads/main/m3u/%E6%B9%96%E5%8D%97%E7%A7%BB%E5%8A%A8.m3u",
    "https://raw.githubusercontent.com/hanhan8127/TVBox/refs/heads/main/live.txt",
    "https://raw.githubusercontent.com/hujingguang/ChinaIPTV/main/cnTV_AutoUpdate.m3u8",
    "https://raw.githubusercontent.com/suxuang/myIPTV/refs/heads/main/ipv4.m3u",
    "https://raw.githubusercontent.com/suxuang/myIPTV/refs/heads/main/ipv6.m3u",
    "https://raw.githubusercontent.com/Free-TV/IPTV/master/playlist.m3u8",
    "",
];
