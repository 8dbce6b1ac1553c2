//! Ordered classification tables. Evaluated top to bottom; first match wins.
//! Adding a category or keyword is a table edit, not a code change.

/// Provider tags checked in this order when a tag list is present.
/// Each entry is `(canonical category, accepted tag spellings)`, already normalized.
pub const TAG_PRIORITY: &[(&str, &[&str])] = &[
    ("DeFi", &["defi"]),
    ("AI", &["ai", "ai big data", "artificial intelligence"]),
    ("Layer 1", &["layer 1"]),
    ("Layer 2", &["layer 2"]),
    ("Meme", &["meme", "memes"]),
    ("Gaming", &["gaming"]),
    ("Metaverse", &["metaverse"]),
    ("NFT", &["nft", "collectibles nfts"]),
    ("Privacy", &["privacy"]),
    ("Web3", &["web3"]),
];

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Exact ticker, case-insensitive.
    Symbol(&'static [&'static str]),
    /// Substring of the lowercased name.
    NameContains(&'static [&'static str]),
    /// Whole word of the lowercased name (split on non-alphanumerics).
    NameWord(&'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, name_lower: &str, symbol: &str) -> bool {
        match self {
            Matcher::Symbol(symbols) => symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol)),
            Matcher::NameContains(needles) => needles.iter().any(|n| name_lower.contains(n)),
            Matcher::NameWord(words) => name_lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|w| words.iter().any(|k| *k == w)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: &'static str,
    pub matcher: Matcher,
}

const fn rule(category: &'static str, matcher: Matcher) -> CategoryRule {
    CategoryRule { category, matcher }
}

/// Name/symbol fallback for records that carry no provider tags.
pub const NAME_RULES: &[CategoryRule] = &[
    rule(
        "Exchange Token",
        Matcher::Symbol(&["BNB", "OKB", "CRO", "LEO", "KCS", "HT", "GT", "BGB", "MX", "WBT"]),
    ),
    rule("Exchange Token", Matcher::NameContains(&["exchange"])),
    rule("Blockchain", Matcher::NameContains(&["blockchain"])),
    rule("Staking", Matcher::Symbol(&["STETH", "WSTETH", "RETH", "CBETH", "JITOSOL", "MSOL"])),
    rule("Staking", Matcher::NameContains(&["staked", "staking"])),
    rule(
        "Layer 1",
        Matcher::Symbol(&[
            "SOL", "ADA", "AVAX", "DOT", "NEAR", "ATOM", "APT", "SUI", "TRX", "TON", "ALGO", "XTZ",
            "EGLD", "FTM", "SEI", "ICP", "HBAR", "KAS", "XLM", "XRP",
        ]),
    ),
    rule(
        "Layer 2",
        Matcher::Symbol(&["MATIC", "POL", "ARB", "OP", "IMX", "STRK", "MNT", "METIS", "ZK"]),
    ),
    rule("Layer 2", Matcher::NameContains(&["rollup"])),
    rule(
        "AI",
        Matcher::Symbol(&["FET", "AGIX", "OCEAN", "RNDR", "RENDER", "TAO", "WLD", "AKT"]),
    ),
    rule("AI", Matcher::NameWord(&["ai"])),
    rule("AI", Matcher::NameContains(&["artificial", "neural"])),
    rule(
        "DeFi",
        Matcher::Symbol(&[
            "UNI", "AAVE", "MKR", "COMP", "CRV", "SUSHI", "LDO", "SNX", "1INCH", "CAKE", "DYDX", "JUP",
        ]),
    ),
    rule("DeFi", Matcher::NameContains(&["swap", "finance", "lend"])),
    rule("Meme", Matcher::Symbol(&["DOGE", "SHIB", "PEPE", "FLOKI", "BONK", "WIF"])),
    rule("Meme", Matcher::NameContains(&["doge", "pepe", "meme"])),
    rule("Meme", Matcher::NameWord(&["inu"])),
    rule("Gaming", Matcher::Symbol(&["AXS", "SAND", "MANA", "GALA", "ENJ", "ILV", "BEAM"])),
    rule("Gaming", Matcher::NameContains(&["game", "gaming"])),
    rule("Privacy", Matcher::Symbol(&["XMR", "ZEC", "DASH", "SCRT", "ROSE"])),
    rule("Privacy", Matcher::NameContains(&["privacy"])),
    rule("NFT", Matcher::Symbol(&["APE", "BLUR", "FLOW"])),
    rule("NFT", Matcher::NameWord(&["nft", "nfts"])),
    rule(
        "Stablecoin",
        Matcher::Symbol(&[
            "USDT", "USDC", "DAI", "BUSD", "TUSD", "USDD", "FDUSD", "PYUSD", "USDE", "FRAX",
        ]),
    ),
    rule("Stablecoin", Matcher::NameContains(&["stable"])),
    rule("Stablecoin", Matcher::NameWord(&["usd"])),
    rule("Bitcoin", Matcher::Symbol(&["BTC", "WBTC", "BCH", "BSV"])),
    rule("Bitcoin", Matcher::NameContains(&["bitcoin"])),
    rule("Ethereum", Matcher::Symbol(&["ETH", "WETH", "ETC"])),
    rule("Ethereum", Matcher::NameWord(&["ethereum", "ether"])),
];
