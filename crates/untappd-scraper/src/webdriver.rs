//! [`Session`] implementation over a W3C WebDriver server via `fantoccini`.

use fantoccini::elements::Element as WdElement;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use untappd_core::BrowserKind;

use crate::driver::{By, Element, Session};
use crate::error::DriverError;

/// A live browser tab driven through a WebDriver server (chromedriver,
/// geckodriver, Selenium).
pub struct WebDriverSession {
    client: Client,
}

/// An element handle owned by a [`WebDriverSession`].
#[derive(Clone)]
pub struct WebDriverElement {
    inner: WdElement,
}

impl WebDriverSession {
    /// Opens a new browser session on the WebDriver server at `webdriver_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Connect`] if the server is unreachable or
    /// refuses to create the session.
    pub async fn connect(
        webdriver_url: &str,
        browser: BrowserKind,
        headless: bool,
    ) -> Result<Self, DriverError> {
        tracing::debug!(webdriver_url, %browser, headless, "connecting to webdriver");
        let connect_error = |e: &dyn std::fmt::Display| DriverError::Connect {
            url: webdriver_url.to_owned(),
            reason: e.to_string(),
        };
        let client = ClientBuilder::rustls()
            .map_err(|e| connect_error(&e))?
            .capabilities(capabilities(browser, headless))
            .connect(webdriver_url)
            .await
            .map_err(|e| connect_error(&e))?;
        Ok(Self { client })
    }

    /// Ends the browser session.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Command`] if the server rejects the request.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client.close().await.map_err(command_error("close"))
    }
}

fn capabilities(browser: BrowserKind, headless: bool) -> fantoccini::wd::Capabilities {
    let mut caps = serde_json::Map::new();
    match browser {
        BrowserKind::Chrome => {
            let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
            if headless {
                args.push("--headless=new");
                args.push("--disable-gpu");
            }
            caps.insert("goog:chromeOptions".to_owned(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let args: Vec<&str> = if headless { vec!["--headless"] } else { Vec::new() };
            caps.insert("moz:firefoxOptions".to_owned(), json!({ "args": args }));
        }
    }
    caps
}

fn command_error(command: &'static str) -> impl FnOnce(CmdError) -> DriverError {
    move |e| DriverError::Command {
        command,
        reason: e.to_string(),
    }
}

/// Where a lookup is rooted; XPath needs a relative prefix under an element.
#[derive(Clone, Copy)]
enum Scope {
    Document,
    Element,
}

/// Owned form of a [`By`], since `fantoccini::Locator` only borrows.
enum Query {
    Css(String),
    Id(String),
    LinkText(String),
    XPath(String),
}

impl Query {
    fn new(by: By<'_>, scope: Scope) -> Self {
        match by {
            By::Id(id) => Query::Id(id.to_owned()),
            By::ClassName(class) => Query::Css(format!(".{class}")),
            By::Tag(tag) | By::Css(tag) => Query::Css(tag.to_owned()),
            By::LinkText(text) => Query::LinkText(text.to_owned()),
            By::ContainsText(text) => {
                let root = match scope {
                    Scope::Document => "//",
                    Scope::Element => ".//",
                };
                Query::XPath(format!("{root}*[contains(text(), {})]", xpath_literal(text)))
            }
        }
    }

    fn locator(&self) -> Locator<'_> {
        match self {
            Query::Css(s) => Locator::Css(s),
            Query::Id(s) => Locator::Id(s),
            Query::LinkText(s) => Locator::LinkText(s),
            Query::XPath(s) => Locator::XPath(s),
        }
    }
}

/// Quotes `text` as an XPath 1.0 string literal.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn found(result: Result<WdElement, CmdError>) -> Result<Option<WebDriverElement>, DriverError> {
    match result {
        Ok(inner) => Ok(Some(WebDriverElement { inner })),
        Err(e) if e.is_no_such_element() => Ok(None),
        Err(e) => Err(command_error("find element")(e)),
    }
}

fn wrap_all(elements: Vec<WdElement>) -> Vec<WebDriverElement> {
    elements
        .into_iter()
        .map(|inner| WebDriverElement { inner })
        .collect()
}

impl Session for WebDriverSession {
    type Element = WebDriverElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await.map_err(command_error("navigate"))
    }

    async fn find_one(&self, by: By<'_>) -> Result<Option<WebDriverElement>, DriverError> {
        let query = Query::new(by, Scope::Document);
        found(self.client.find(query.locator()).await)
    }

    async fn find_many(&self, by: By<'_>) -> Result<Vec<WebDriverElement>, DriverError> {
        let query = Query::new(by, Scope::Document);
        self.client
            .find_all(query.locator())
            .await
            .map(wrap_all)
            .map_err(command_error("find elements"))
    }

    async fn switch_frame(&self, frame: &WebDriverElement) -> Result<(), DriverError> {
        frame
            .inner
            .enter_frame()
            .await
            .map_err(command_error("switch to frame"))
    }

    async fn switch_default_context(&self) -> Result<(), DriverError> {
        self.client
            .enter_frame(None)
            .await
            .map_err(command_error("switch to default content"))
    }
}

impl Element for WebDriverElement {
    async fn text(&self) -> Result<String, DriverError> {
        self.inner.text().await.map_err(command_error("get element text"))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.inner
            .attr(name)
            .await
            .map_err(command_error("get element attribute"))
    }

    async fn property(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.inner
            .prop(name)
            .await
            .map_err(command_error("get element property"))
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.inner.click().await.map_err(command_error("click"))
    }

    async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        self.inner
            .send_keys(text)
            .await
            .map_err(command_error("send keys"))
    }

    async fn find_one(&self, by: By<'_>) -> Result<Option<Self>, DriverError> {
        let query = Query::new(by, Scope::Element);
        found(self.inner.find(query.locator()).await)
    }

    async fn find_many(&self, by: By<'_>) -> Result<Vec<Self>, DriverError> {
        let query = Query::new(by, Scope::Element);
        self.inner
            .find_all(query.locator())
            .await
            .map(wrap_all)
            .map_err(command_error("find elements"))
    }
}
