//! Crawl planner
//!
//! This module decides which pages of one organization's website are tried,
//! and in which order:
//!
//! 1. the website URL itself (the homepage)
//! 2. the site root, if the website URL pointed below it
//! 3. well-known contact paths, most specific first
//! 4. same-site links discovered on pages already fetched, in discovery order
//!
//! A hard ceiling caps the total number of URLs handed out per entity.

use crate::url::{same_site, visit_key};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Extensions of links that never lead to a contact page
const ASSET_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "css", "js", "zip", "rar", "doc",
    "docx", "xls", "xlsx", "ppt", "pptx", "mp3", "mp4", "mov", "avi",
];

/// Builds crawl targets with a fixed path list and ceiling
#[derive(Debug, Clone)]
pub struct CrawlPlanner {
    contact_paths: Vec<String>,
    max_pages: usize,
}

impl CrawlPlanner {
    pub fn new(contact_paths: Vec<String>, max_pages: usize) -> Self {
        Self {
            contact_paths,
            max_pages,
        }
    }

    /// Starts a fresh plan for `root`
    ///
    /// Planning the same root twice always yields the same initial sequence.
    pub fn plan(&self, root: &Url) -> CrawlTarget {
        let mut target = CrawlTarget {
            root: root.clone(),
            fixed: VecDeque::new(),
            discovered: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            yielded: 0,
            max_pages: self.max_pages,
        };

        target.push_fixed(root.clone());

        let mut origin = root.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        target.push_fixed(origin.clone());

        for path in &self.contact_paths {
            if let Ok(url) = origin.join(path.trim_start_matches('/')) {
                target.push_fixed(url);
            }
        }

        target
    }
}

/// Per-entity crawl plan; discarded once the entity completes
#[derive(Debug)]
pub struct CrawlTarget {
    root: Url,
    fixed: VecDeque<Url>,
    discovered: VecDeque<Url>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    yielded: usize,
    max_pages: usize,
}

impl CrawlTarget {
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// URLs handed out so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// URLs that may still be handed out before the ceiling
    pub fn remaining(&self) -> usize {
        self.max_pages.saturating_sub(self.yielded)
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Hands out the next URL to fetch, or None when the plan is exhausted
    pub fn next_url(&mut self) -> Option<Url> {
        if self.remaining() == 0 {
            return None;
        }

        loop {
            let url = self
                .fixed
                .pop_front()
                .or_else(|| self.discovered.pop_front())?;

            let Ok(key) = visit_key(&url) else {
                continue;
            };
            if !self.visited.insert(key) {
                continue;
            }

            self.yielded += 1;
            return Some(url);
        }
    }

    /// Queues links found on a fetched page
    ///
    /// Off-site links, asset links and anything already queued or visited
    /// are ignored. Discovered links are only handed out after every fixed
    /// path has been tried.
    pub fn add_discovered<I>(&mut self, links: I)
    where
        I: IntoIterator<Item = Url>,
    {
        for mut link in links {
            if !same_site(&self.root, &link) || is_asset(&link) {
                continue;
            }
            link.set_fragment(None);

            let Ok(key) = visit_key(&link) else {
                continue;
            };
            if self.visited.contains(&key) || !self.queued.insert(key) {
                continue;
            }
            self.discovered.push_back(link);
        }
    }

    /// Records a page reached through a redirect so it is not fetched again
    pub fn mark_visited(&mut self, url: &Url) {
        if let Ok(key) = visit_key(url) {
            self.visited.insert(key);
        }
    }

    /// Drops every queued URL on the same site as `url`
    pub fn abandon_site(&mut self, url: &Url) {
        self.fixed.retain(|queued| !same_site(queued, url));
        self.discovered.retain(|queued| !same_site(queued, url));
    }

    fn push_fixed(&mut self, url: Url) {
        if let Ok(key) = visit_key(&url) {
            if self.queued.insert(key) {
                self.fixed.push_back(url);
            }
        }
    }
}

fn is_asset(url: &Url) -> bool {
    url.path()
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .is_some_and(|(_, ext)| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
