use serde::Deserialize;

/// Main configuration structure for Race-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub headers: HeaderConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "course")]
    pub courses: Vec<CourseEntry>,
}

impl Config {
    /// Returns every course belonging to the given region code
    pub fn courses_in_region(&self, region: &str) -> Vec<&CourseEntry> {
        self.courses
            .iter()
            .filter(|c| c.region.eq_ignore_ascii_case(region))
            .collect()
    }

    /// Looks up a course by its identifier
    pub fn course(&self, id: &str) -> Option<&CourseEntry> {
        self.courses.iter().find(|c| c.id == id)
    }
}

/// HTTP fetch and worker pool behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FetcherConfig {
    /// Total request timeout (milliseconds)
    pub timeout_ms: u64,

    /// Connection establishment timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Redirect hops followed before the fetch counts as a transport failure
    pub max_redirects: usize,

    /// Number of URLs processed concurrently
    pub concurrency: usize,

    /// Total attempts per URL for retryable verdicts (1 = no re-attempt)
    pub max_attempts: u32,

    /// First backoff delay (milliseconds), doubled per attempt
    pub backoff_base_ms: u64,

    /// Upper bound on a single backoff delay (milliseconds)
    pub backoff_max_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            max_redirects: 10,
            concurrency: 4,
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 8_000,
        }
    }
}

/// Request header rotation pool
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HeaderConfig {
    /// User agents drawn from at random for each request
    pub user_agents: Vec<String>,

    /// Accept-Language values drawn from at random for each request
    pub accept_languages: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            ],
            accept_languages: vec![
                "en-GB,en;q=0.9".to_string(),
                "en-US,en;q=0.9".to_string(),
                "en;q=0.8".to_string(),
            ],
        }
    }
}

/// Soft-error page detection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ValidatorConfig {
    /// Phrases whose presence in the page text marks an error page
    pub error_phrases: Vec<String>,

    /// Fragments of the final URL that mark a redirect to an error page
    ///
    /// Matched case-insensitively anywhere in the URL; the default `error`
    /// also catches paths such as `/error-page` and `?error=1`.
    pub error_url_fragments: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            error_phrases: vec![
                "sorry".to_string(),
                "page not found".to_string(),
                "no longer available".to_string(),
                "does not exist".to_string(),
                "not found".to_string(),
            ],
            error_url_fragments: vec!["error".to_string()],
        }
    }
}

/// Field extraction scheme
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractConfig {
    /// Selectors that mark a void page (skipped, written to neither store)
    pub void_markers: Vec<String>,

    /// Extracted fields, in output column order
    #[serde(rename = "field")]
    pub fields: Vec<FieldEntry>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            void_markers: Vec::new(),
            fields: vec![FieldEntry {
                name: "race_info".to_string(),
                selector: "div.rp-raceInfo li".to_string(),
                delimiter: " ||".to_string(),
            }],
        }
    }
}

/// One extracted output column
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEntry {
    /// Column name in the output header
    pub name: String,

    /// CSS selector for the items joined into this field
    pub selector: String,

    /// Separator placed between item texts
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    " ||".to_string()
}

/// Target site locations used by URL discovery
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SiteConfig {
    /// Site root; result pages live under `{base_url}/results`
    pub base_url: String,

    /// JSON index of a course's races: `{course_index_url}/{id}/{year}/{code}/all-races`
    pub course_index_url: String,

    /// Selector for course-result links on a daily results page
    pub date_link_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.racingpost.com".to_string(),
            course_index_url: "https://www.racingpost.com:443/profile/course/filter/results"
                .to_string(),
            date_link_selector: "a[data-test-selector='link-listCourseNameLink']".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Root directory for record and failure stores
    pub data_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "../data".to_string(),
        }
    }
}

/// Course metadata entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CourseEntry {
    /// Site course identifier (e.g. "11")
    pub id: String,

    /// Course name as it appears in result URLs
    pub name: String,

    /// Region code the course belongs to (e.g. "gb", "ire")
    pub region: String,
}
