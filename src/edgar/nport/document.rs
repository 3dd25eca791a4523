//! A forgiving element tree for EDGAR submission files.
//!
//! Complete submission `.txt` files wrap the form's XML in an SGML header whose
//! tags are never closed (`<CLASS-CONTRACT-TICKER-SYMBOL>GCEQX`). The tree here
//! accepts that: an end tag closes the nearest open element with the same name and
//! everything opened inside it, and stray end tags are ignored.
//!
//! Nodes are stored in pre-order, so the descendants of a node are the contiguous
//! run of ids between it and its `end`.

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

const ROOT: usize = 0;

#[derive(Debug)]
enum Content {
    Element(usize),
    Text(String),
}

#[derive(Debug)]
struct Node {
    /// Local name, namespace prefix stripped
    name: String,
    children: Vec<Content>,
    /// One past the last descendant id
    end: usize,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    id: usize,
}

struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<usize>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                children: Vec::new(),
                end: 1,
            }],
            open: vec![ROOT],
        }
    }

    fn current(&self) -> usize {
        self.open.last().copied().unwrap_or(ROOT)
    }

    fn start(&mut self, name: String) {
        let id = self.nodes.len();
        let parent = self.current();
        self.nodes.push(Node {
            name,
            children: Vec::new(),
            end: id + 1,
        });
        self.nodes[parent].children.push(Content::Element(id));
        self.open.push(id);
    }

    fn end(&mut self, name: &str) {
        let nodes = &self.nodes;
        let position = self
            .open
            .iter()
            .rposition(|&id| id != ROOT && nodes[id].name.eq_ignore_ascii_case(name));

        match position {
            Some(pos) => {
                let end = self.nodes.len();
                for id in self.open.drain(pos..) {
                    self.nodes[id].end = end;
                }
            }
            None => debug!("Ignoring unmatched end tag </{}>", name),
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        self.nodes[parent].children.push(Content::Text(text));
    }

    fn finish(mut self) -> Document {
        let end = self.nodes.len();
        for id in self.open.drain(..) {
            self.nodes[id].end = end;
        }
        Document { nodes: self.nodes }
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

impl Document {
    /// Builds the tree, failing only when the input has no markup at all or the
    /// tokenizer cannot make sense of it.
    pub fn parse(source_name: &str, content: &str) -> Result<Self> {
        let parse_error = |message: String| Error::Parse {
            source_name: source_name.to_string(),
            message,
        };

        let mut reader = Reader::from_str(content);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut builder = TreeBuilder::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => builder.start(local_name(e.local_name().as_ref())),
                Ok(Event::Empty(e)) => {
                    let name = local_name(e.local_name().as_ref());
                    builder.start(name.clone());
                    builder.end(&name);
                }
                Ok(Event::End(e)) => builder.end(&local_name(e.local_name().as_ref())),
                Ok(Event::Text(e)) => {
                    // SGML headers carry bare ampersands in company names
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    builder.text(text);
                }
                Ok(Event::CData(e)) => builder.text(String::from_utf8_lossy(&e).into_owned()),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(parse_error(format!(
                        "{} at position {}",
                        e,
                        reader.error_position()
                    )))
                }
                _ => (),
            }
        }

        let document = builder.finish();
        if document.nodes.len() == 1 {
            return Err(parse_error("document contains no elements".to_string()));
        }
        Ok(document)
    }

    pub fn root(&self) -> Element<'_> {
        Element { doc: self, id: ROOT }
    }
}

impl<'a> Element<'a> {
    fn node(&self) -> &'a Node {
        &self.doc.nodes[self.id]
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    /// Tag names are compared case-insensitively.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.name().eq_ignore_ascii_case(tag)
    }

    /// All elements below this one, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = Element<'a>> {
        let doc = self.doc;
        (self.id + 1..self.node().end).map(move |id| Element { doc, id })
    }

    /// First descendant with the given tag.
    pub fn find(&self, tag: &str) -> Option<Element<'a>> {
        self.descendants().find(|e| e.has_tag(tag))
    }

    pub fn find_all<'t>(&self, tag: &'t str) -> impl Iterator<Item = Element<'a>> + 't
    where
        'a: 't,
    {
        self.descendants().filter(move |e| e.has_tag(tag))
    }

    /// Concatenated text of this element and all its descendants.
    ///
    /// Unclosed SGML tags nest arbitrarily deep, so the walk keeps its own stack.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut pending = vec![self.node().children.iter()];
        while let Some(children) = pending.last_mut() {
            match children.next() {
                Some(Content::Text(text)) => out.push_str(text),
                Some(Content::Element(id)) => pending.push(self.doc.nodes[*id].children.iter()),
                None => {
                    pending.pop();
                }
            }
        }
        out
    }
}
