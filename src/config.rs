use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::records::PageKind;

const DEFAULT_SITEMAP_INDEX: &str = "https://www.espncricinfo.com/sitemap.xml";

const DEFAULT_SITEMAPS: &[&str] = &[
    "https://www.espncricinfo.com/sitemap/news-sitemap.xml",
    "https://www.espncricinfo.com/sitemap/standalone.xml.gz",
    "https://www.espncricinfo.com/sitemap/hindi/sitemap.xml",
    "https://www.espncricinfo.com/sitemap/overall-match.xml.gz",
    "https://www.espncricinfo.com/sitemap/overall-series.xml.gz",
    "https://www.espncricinfo.com/sitemap/story.xml.gz",
    "https://www.espncricinfo.com/sitemap/overall-cricketer.xml.gz",
    "https://www.espncricinfo.com/sitemap/overall-cricketer-1.xml.gz",
    "https://www.espncricinfo.com/sitemap/overall-cricketer-2.xml.gz",
    "https://www.espncricinfo.com/sitemap/overall-cricketer-3.xml.gz",
    "https://www.espncricinfo.com/sitemap/format-record.xml.gz",
    "https://www.espncricinfo.com/sitemap/overall-team.xml.gz",
    "https://www.espncricinfo.com/sitemap/overall-videos.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-decade-0.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-1.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-2.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-3.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-4.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-5.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-6.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-7.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-8.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-10.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-11.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-12.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-13.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-15.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-16.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-17.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-18.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-19.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-20.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-21.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-22.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-23.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-25.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-26.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-27.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-28.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-29.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-30.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-31.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-32.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-33.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-34.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-35.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-37.xml.gz",
    "https://www.espncricinfo.com/sitemap/records-headtohead-38.xml.gz",
];

const DEFAULT_ROSTER: &[&str] = &[
    "Pat Cummins", "David Warner", "Marnus Labuschagne", "Steve Smith", "Usman Khawaja",
    "Travis Head", "Cameron Green", "Alex Carey", "Mitchell Starc", "Nathan Lyon",
    "Josh Hazlewood", "Rohit Sharma", "Shubman Gill", "Cheteshwar Pujara", "Virat Kohli",
    "Ajinkya Rahane", "Ravindra Jadeja", "Rishabh Pant", "Ravichandran Ashwin",
    "Mohammed Shami", "Jasprit Bumrah", "Mohammed Siraj", "Dean Elgar", "Aiden Markram",
    "Rassie van der Dussen", "Temba Bavuma", "Quinton de Kock", "Keshav Maharaj",
    "Kagiso Rabada", "Anrich Nortje", "Lungi Ngidi", "Marco Jansen", "Wiaan Mulder",
    "Ben Stokes", "Zak Crawley", "Ben Duckett", "Joe Root", "Harry Brook", "Jonny Bairstow",
    "Moeen Ali", "Chris Woakes", "Stuart Broad", "James Anderson", "Ollie Robinson",
    "Kane Williamson", "Tom Latham", "Devon Conway", "Henry Nicholls", "Daryl Mitchell",
    "Tom Blundell", "Colin de Grandhomme", "Tim Southee", "Trent Boult", "Neil Wagner",
    "Matt Henry", "Dimuth Karunaratne", "Pathum Nissanka", "Kusal Mendis", "Angelo Mathews",
    "Dhananjaya de Silva", "Dinesh Chandimal", "Ramesh Mendis", "Lasith Embuldeniya",
    "Suranga Lakmal", "Lahiru Kumara", "Vishwa Fernando", "Babar Azam", "Abdullah Shafique",
    "Azhar Ali", "Fawad Alam", "Mohammad Rizwan", "Faheem Ashraf", "Shaheen Afridi",
    "Hasan Ali", "Naseem Shah", "Yasir Shah", "Nauman Ali", "Kraigg Brathwaite",
    "John Campbell", "Nkrumah Bonner", "Shai Hope", "Jason Holder", "Kyle Mayers",
    "Kemar Roach", "Alzarri Joseph", "Shannon Gabriel", "Jomel Warrican", "Roston Chase",
    "Mominul Haque", "Tamim Iqbal", "Mushfiqur Rahim", "Shakib Al Hasan", "Liton Das",
    "Mehidy Hasan Miraz", "Taskin Ahmed", "Mustafizur Rahman", "Shoriful Islam",
    "Ebadot Hossain", "Taijul Islam", "Andrew Balbirnie", "Paul Stirling", "Harry Tector",
    "Kevin O'Brien", "George Dockrell", "Lorcan Tucker", "Mark Adair", "Barry McCarthy",
    "Andy McBrine", "Joshua Little", "Craig Young", "Hashmatullah Shahidi", "Rahmat Shah",
    "Ikram Alikhil", "Afsar Zazai", "Riaz Hassan", "Sediqullah Atal", "Abdul Malik",
    "Bahir Shah Mahboob", "Ismat Alam", "Azmatullah Omarzai", "Zahir Khan",
    "Zia Ur Rehman Akbar", "Zahir Shehzad", "Rashid Khan", "Yamin Ahmadzai",
    "Bashir Ahmad Afghan", "Naveed Zadran", "Fareed Ahmad Malik", "Rakep Patel",
    "Irfan Karim", "Shem Ngoche", "Lucas Oluoch Ndandason", "Dhiren Gondaria",
    "Peter Langat", "Sachin Bhudia", "Gerard Muthui", "Vraj Patel", "Francis Muia Mutua",
    "Rushabvardhan Patel", "Pushkar Sharma", "Neil Mugabe", "Sachin Gill",
];

/// Static inputs for a run. Every field falls back to its default when missing from the
/// JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sitemaps: Vec<String>,
    pub sitemap_index: String,
    pub roster: Vec<String>,
    pub match_urls: Vec<String>,
    pub team_urls: Vec<String>,
    pub player_urls: Vec<String>,
    /// Regex applied to crawled URLs before roster matching.
    pub url_filter: Option<String>,
    pub user_agent: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sitemaps: DEFAULT_SITEMAPS.iter().map(|s| s.to_string()).collect(),
            sitemap_index: DEFAULT_SITEMAP_INDEX.to_string(),
            roster: DEFAULT_ROSTER.iter().map(|s| s.to_string()).collect(),
            match_urls: Vec::new(),
            team_urls: Vec::new(),
            player_urls: Vec::new(),
            url_filter: None,
            user_agent: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load from a JSON file, or use the built-in defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config {}", p.display()))?;
                let config: Config = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse config {}", p.display()))?;
                info!("Loaded config from {}", p.display());
                config
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let lists = [
            ("sitemaps", &self.sitemaps),
            ("match_urls", &self.match_urls),
            ("team_urls", &self.team_urls),
            ("player_urls", &self.player_urls),
        ];
        for (key, urls) in lists {
            for url in urls {
                Url::parse(url).with_context(|| format!("Invalid URL in {}: {}", key, url))?;
            }
        }
        Url::parse(&self.sitemap_index)
            .with_context(|| format!("Invalid sitemap_index: {}", self.sitemap_index))?;
        if self.roster.iter().any(|name| name.trim().is_empty()) {
            bail!("roster contains an empty name");
        }
        self.url_filter()?;
        Ok(())
    }

    pub fn url_filter(&self) -> Result<Option<Regex>> {
        self.url_filter
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("Invalid url_filter: {}", pattern))
            })
            .transpose()
    }

    pub fn page_urls(&self, kind: PageKind) -> &[String] {
        match kind {
            PageKind::Match => &self.match_urls,
            PageKind::Team => &self.team_urls,
            PageKind::Player => &self.player_urls,
        }
    }
}
