// Built-in defaults for the known shops.

pub const DEFAULT_BASE_URL: &str = "https://store.ryanai.org/";
pub const DEFAULT_COOKIE_ENV: &str = "LDC_COOKIE";
pub const DEFAULT_ACTION_CONFIG_FILE: &str = "state/action_ids.json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const MIN_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// (host, status action id, checkin action id)
const BUILTIN_ACTION_IDS: &[(&str, &str, &str)] = &[
    (
        "store.ryanai.org",
        "00047583cb7e0d3bd45fc537bd80dc9c6a7c04a1e8",
        "00573f21cb6fdebcbb247b7ddbec9edcf954d96992",
    ),
    (
        "oeo.cc.cd",
        "0020b40a07230b826fc09ad75e17528ec60fb3a27d",
        "0035d168722cee2c38c16bc8067f36a10067ee30ba",
    ),
    (
        "ldc-shop.3-418.workers.dev",
        "00ec8c9facbe1fdceb7685cd71a8bfeb02d4fdede7",
        "009d7dd2852e6e10b697787cba9a82d33cc5041694",
    ),
    (
        "ldc.wxqq.de5.net",
        "00e4e8841f678dbf8b88c158c6d22ca296ab0c3e4f",
        "00d85e3a8ba71bd3e0a3bd837fba3976cc965525c9",
    ),
];

/// (host, cookie file); also the `--run-all` shop list, in order.
const SHOP_COOKIE_FILES: &[(&str, &str)] = &[
    ("store.ryanai.org", "state/ryanai.cookie"),
    ("oeo.cc.cd", "state/oeo.cookie"),
    ("ldc-shop.3-418.workers.dev", "state/ldc-shop.3-418.cookie"),
    ("ldc.wxqq.de5.net", "state/ldc.wxqq.de5.net.cookie"),
];

/// Built-in (status, checkin) action ids for `host`.
pub fn builtin_action_ids(host: &str) -> Option<(&'static str, &'static str)> {
    BUILTIN_ACTION_IDS
        .iter()
        .find(|(h, _, _)| *h == host)
        .map(|(_, status, checkin)| (*status, *checkin))
}

pub fn default_cookie_file_for_host(host: &str) -> String {
    SHOP_COOKIE_FILES
        .iter()
        .find(|(h, _)| *h == host)
        .map(|(_, file)| file.to_string())
        .unwrap_or_else(|| format!("state/{}.cookie", host))
}

pub fn all_shop_urls() -> Vec<String> {
    SHOP_COOKIE_FILES
        .iter()
        .map(|(host, _)| format!("https://{}/", host))
        .collect()
}
