// MIT License - Copyright (c) 2026 Peter Wright
// Portal URLs, form field names and page element ids

/// Default portal origin.
pub const DEFAULT_BASE_URL: &str = "https://www.alarm.com";

/// Login landing page. Redirects may embed the session key in the final URL.
pub const LOGIN_PAGE_PATH: &str = "/login.aspx";
/// Target of the login form POST.
pub const LOGIN_POST_PATH: &str = "/web/Default.aspx";
/// Server-rendered status page carrying the arming label and arm/disarm buttons.
pub const STATUS_PAGE_PATH: &str = "/pda/Default.aspx";
/// Prefix of the internal JSON API.
pub const API_PREFIX: &str = "/web/api/";

pub const API_AVAILABLE_SYSTEMS: &str = "systems/availableSystemItems";
pub const API_SYSTEMS: &str = "systems/systems/";
pub const API_PARTITIONS: &str = "devices/partitions/";
pub const API_SENSORS: &str = "devices/sensors";

/// Default request bound.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_3) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/64.0.3282.167 Safari/537.36";

// ASP.NET hidden form state
pub const VIEWSTATE: &str = "__VIEWSTATE";
pub const VIEWSTATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";
pub const EVENT_VALIDATION: &str = "__EVENTVALIDATION";

// Login form fields
pub const LOGIN_ID_FIELD: &str = "ctl00$ContentPlaceHolder1$loginform$hidLoginID";
pub const LOGIN_USERNAME_FIELD: &str = "ctl00$ContentPlaceHolder1$loginform$txtUserName";
pub const LOGIN_PASSWORD_FIELD: &str = "ctl00$ContentPlaceHolder1$loginform$txtPassword";
pub const LOGIN_BUTTON_FIELD: &str = "ctl00$ContentPlaceHolder1$loginform$signInButton";
pub const LOGIN_BUTTON_VALUE: &str = "Logging In...";
pub const ZIP_FIELD: &str = "ctl00$bottom_footer3$ucCLS_ZIP$txtZip";
pub const ZIP_VALUE: &str = "Zip Code";

/// Static fields the portal expects alongside the credentials.
pub const LOGIN_STATIC_FIELDS: [(&str, &str); 5] = [
    ("IsFromNewSite", "1"),
    ("JavaScriptTest", "1"),
    (LOGIN_ID_FIELD, ""),
    (LOGIN_BUTTON_FIELD, LOGIN_BUTTON_VALUE),
    (ZIP_FIELD, ZIP_VALUE),
];

/// Element carrying the credentials-failure message on the login page.
pub const LOGIN_ERROR_PANEL_ID: &str = "ctl00_ContentPlaceHolder1_loginform_ErrorPanel";

/// Element carrying the arming state label on the status page.
pub const ARMING_STATE_ID: &str = "ctl00_phBody_lblArmingState";

// Status page buttons
pub const BTN_DISARM: &str = "ctl00$phBody$butDisarm";
pub const BTN_ARM_STAY: &str = "ctl00$phBody$butArmStay";
pub const BTN_ARM_AWAY: &str = "ctl00$phBody$butArmAway";

/// Cookie holding the anti-forgery key for JSON API calls.
pub const AJAX_KEY_COOKIE: &str = "afg";
pub const AJAX_KEY_HEADER: &str = "ajaxrequestuniquekey";
pub const API_ACCEPT: &str = "application/vnd.api+json";
pub const API_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Capacity of the client event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
