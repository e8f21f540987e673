//! In-memory DOM implementing [`Session`] / [`Element`] for unit tests.
//!
//! Nodes live in an arena behind `Arc<Mutex<_>>`. Click handlers and lookup
//! hooks mutate the tree, which is how tests model "Show More" revealing
//! content or a page that finishes rendering after a few polls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::driver::{By, Element, Session};
use crate::error::DriverError;

pub(crate) type NodeId = usize;
type Hook = Arc<dyn Fn(&mut Dom) + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    attrs: HashMap<String, String>,
    props: HashMap<String, String>,
    children: Vec<NodeId>,
    detached: bool,
    on_click: Option<Hook>,
    click_fails: bool,
}

impl Node {
    pub(crate) fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            ..Self::default()
        }
    }

    pub(crate) fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self.attrs.insert("id".to_owned(), id.to_owned());
        self
    }

    pub(crate) fn class(mut self, class_attr: &str) -> Self {
        self.classes = class_attr.split_whitespace().map(str::to_owned).collect();
        self.attrs.insert("class".to_owned(), class_attr.to_owned());
        self
    }

    pub(crate) fn text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    pub(crate) fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Sets a DOM property that differs from the markup attribute, such as
    /// the resolved form of a relative `href`.
    pub(crate) fn prop(mut self, name: &str, value: &str) -> Self {
        self.props.insert(name.to_owned(), value.to_owned());
        self
    }

    pub(crate) fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    pub(crate) fn on_click(mut self, hook: impl Fn(&mut Dom) + Send + Sync + 'static) -> Self {
        self.on_click = Some(Arc::new(hook));
        self
    }

    pub(crate) fn click_fails(mut self) -> Self {
        self.click_fails = true;
        self
    }
}

pub(crate) struct Dom {
    nodes: Vec<Node>,
    frame: Option<NodeId>,
    failing: Vec<String>,
    lookup_hook: Option<Hook>,
    fail_default_switch: bool,
    pub(crate) lookups: usize,
    pub(crate) clicks: Vec<NodeId>,
    pub(crate) navigations: Vec<String>,
    pub(crate) typed: Vec<(NodeId, String)>,
    pub(crate) default_switches: usize,
}

impl Dom {
    pub(crate) fn attach(&mut self, id: NodeId) {
        self.nodes[id].detached = false;
    }

    pub(crate) fn detach(&mut self, id: NodeId) {
        self.nodes[id].detached = true;
    }

    pub(crate) fn current_frame(&self) -> Option<NodeId> {
        self.frame
    }

    pub(crate) fn set_text(&mut self, id: NodeId, text: &str) {
        text.clone_into(&mut self.nodes[id].text);
    }

    fn matches(&self, id: NodeId, by: By<'_>) -> bool {
        let node = &self.nodes[id];
        match by {
            By::Id(want) => node.id.as_deref() == Some(want),
            By::ClassName(want) => node.classes.iter().any(|c| c == want),
            By::Tag(want) => node.tag == want,
            By::Css(css) => match parse_attr_selector(css) {
                Some((tag, attr, value)) => {
                    node.tag == tag && node.attrs.get(attr).map(String::as_str) == Some(value)
                }
                None => node.tag == css,
            },
            By::LinkText(want) => node.tag == "a" && self.full_text(id).trim() == want,
            By::ContainsText(want) => node.text.contains(want),
        }
    }

    fn full_text(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        let mut parts = Vec::new();
        if !node.text.is_empty() {
            parts.push(node.text.clone());
        }
        for &child in &node.children {
            if !self.nodes[child].detached {
                let t = self.full_text(child);
                if !t.is_empty() {
                    parts.push(t);
                }
            }
        }
        parts.join(" ")
    }

    /// Attached descendants of `root` in document order. Frame contents are
    /// only visible when the frame itself is the root.
    fn descendants(&self, root: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[root].children {
            let node = &self.nodes[child];
            if node.detached {
                continue;
            }
            out.push(child);
            if node.tag != "iframe" {
                self.descendants(child, out);
            }
        }
    }

    fn is_attached(&self, id: NodeId) -> bool {
        if self.nodes[id].detached {
            return false;
        }
        match self.parent(id) {
            Some(parent) => self.is_attached(parent),
            None => true,
        }
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.children.contains(&id))
    }

    fn search(&self, root: NodeId, by: By<'_>) -> Result<Vec<NodeId>, DriverError> {
        if self.failing.iter().any(|f| *f == by.to_string()) {
            return Err(DriverError::Command {
                command: "find element",
                reason: format!("injected failure for {by}"),
            });
        }
        let mut all = Vec::new();
        self.descendants(root, &mut all);
        Ok(all.into_iter().filter(|&id| self.matches(id, by)).collect())
    }
}

fn parse_attr_selector(css: &str) -> Option<(&str, &str, &str)> {
    let (tag, rest) = css.split_once('[')?;
    let inner = rest.strip_suffix(']')?;
    let (attr, value) = inner.split_once('=')?;
    let value = value.trim_matches(|c| c == '\'' || c == '"');
    Some((tag, attr, value))
}

fn stale(command: &'static str) -> DriverError {
    DriverError::Command {
        command,
        reason: "stale element reference".to_owned(),
    }
}

#[derive(Clone)]
pub(crate) struct FakeSession {
    dom: Arc<Mutex<Dom>>,
}

#[derive(Clone)]
pub(crate) struct FakeElement {
    dom: Arc<Mutex<Dom>>,
    id: NodeId,
}

impl FakeSession {
    pub(crate) fn new() -> Self {
        let root = Node::tag("html");
        Self {
            dom: Arc::new(Mutex::new(Dom {
                nodes: vec![root],
                frame: None,
                failing: Vec::new(),
                lookup_hook: None,
                fail_default_switch: false,
                lookups: 0,
                clicks: Vec::new(),
                navigations: Vec::new(),
                typed: Vec::new(),
                default_switches: 0,
            })),
        }
    }

    pub(crate) fn root() -> NodeId {
        0
    }

    pub(crate) fn dom(&self) -> MutexGuard<'_, Dom> {
        self.dom.lock().unwrap()
    }

    /// Id the next [`FakeSession::add`] call will return. Lets click hooks
    /// refer to the node they are attached to.
    pub(crate) fn next_id(&self) -> NodeId {
        self.dom().nodes.len()
    }

    /// Appends `node` under `parent` and returns its id.
    pub(crate) fn add(&self, parent: NodeId, node: Node) -> NodeId {
        let mut dom = self.dom();
        let id = dom.nodes.len();
        dom.nodes.push(node);
        dom.nodes[parent].children.push(id);
        id
    }

    /// Makes every lookup matching `by` fail with a driver error.
    pub(crate) fn fail_lookups(&self, by: By<'_>) {
        self.dom().failing.push(by.to_string());
    }

    pub(crate) fn fail_default_switch(&self) {
        self.dom().fail_default_switch = true;
    }

    /// Runs `hook` before every session-level lookup.
    pub(crate) fn on_lookup(&self, hook: impl Fn(&mut Dom) + Send + Sync + 'static) {
        self.dom().lookup_hook = Some(Arc::new(hook));
    }

    fn element(&self, id: NodeId) -> FakeElement {
        FakeElement {
            dom: Arc::clone(&self.dom),
            id,
        }
    }

    fn session_search(&self, by: By<'_>) -> Result<Vec<NodeId>, DriverError> {
        let mut dom = self.dom();
        dom.lookups += 1;
        if let Some(hook) = dom.lookup_hook.clone() {
            hook(&mut *dom);
        }
        let root = dom.frame.unwrap_or(Self::root());
        dom.search(root, by)
    }
}

impl Session for FakeSession {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut dom = self.dom();
        dom.navigations.push(url.to_owned());
        dom.frame = None;
        Ok(())
    }

    async fn find_one(&self, by: By<'_>) -> Result<Option<FakeElement>, DriverError> {
        let ids = self.session_search(by)?;
        Ok(ids.first().map(|&id| self.element(id)))
    }

    async fn find_many(&self, by: By<'_>) -> Result<Vec<FakeElement>, DriverError> {
        let ids = self.session_search(by)?;
        Ok(ids.into_iter().map(|id| self.element(id)).collect())
    }

    async fn switch_frame(&self, frame: &FakeElement) -> Result<(), DriverError> {
        let mut dom = self.dom();
        if dom.nodes[frame.id].tag != "iframe" {
            return Err(DriverError::Command {
                command: "switch to frame",
                reason: "element is not a frame".to_owned(),
            });
        }
        dom.frame = Some(frame.id);
        Ok(())
    }

    async fn switch_default_context(&self) -> Result<(), DriverError> {
        let mut dom = self.dom();
        dom.default_switches += 1;
        if dom.fail_default_switch {
            return Err(DriverError::Command {
                command: "switch to default content",
                reason: "injected failure".to_owned(),
            });
        }
        dom.frame = None;
        Ok(())
    }
}

impl FakeElement {
    fn lock(&self) -> MutexGuard<'_, Dom> {
        self.dom.lock().unwrap()
    }
}

impl Element for FakeElement {
    async fn text(&self) -> Result<String, DriverError> {
        let dom = self.lock();
        if !dom.is_attached(self.id) {
            return Err(stale("get element text"));
        }
        Ok(dom.full_text(self.id))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        let dom = self.lock();
        Ok(dom.nodes[self.id].attrs.get(name).cloned())
    }

    async fn property(&self, name: &str) -> Result<Option<String>, DriverError> {
        let dom = self.lock();
        let node = &dom.nodes[self.id];
        Ok(node.props.get(name).or_else(|| node.attrs.get(name)).cloned())
    }

    async fn click(&self) -> Result<(), DriverError> {
        let mut dom = self.lock();
        if !dom.is_attached(self.id) {
            return Err(stale("click"));
        }
        if dom.nodes[self.id].click_fails {
            return Err(DriverError::Command {
                command: "click",
                reason: "element click intercepted".to_owned(),
            });
        }
        dom.clicks.push(self.id);
        if let Some(hook) = dom.nodes[self.id].on_click.clone() {
            hook(&mut *dom);
        }
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        let mut dom = self.lock();
        dom.typed.push((self.id, text.to_owned()));
        Ok(())
    }

    async fn find_one(&self, by: By<'_>) -> Result<Option<Self>, DriverError> {
        let ids = self.lock().search(self.id, by)?;
        Ok(ids.first().map(|&id| FakeElement {
            dom: Arc::clone(&self.dom),
            id,
        }))
    }

    async fn find_many(&self, by: By<'_>) -> Result<Vec<Self>, DriverError> {
        let ids = self.lock().search(self.id, by)?;
        Ok(ids
            .into_iter()
            .map(|id| FakeElement {
                dom: Arc::clone(&self.dom),
                id,
            })
            .collect())
    }
}
