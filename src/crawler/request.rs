use crate::extract::DetailLink;
use std::fmt;
use url::Url;

/// What a fetched page will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// A results-listing page with its 1-based index
    List { page: u32 },

    /// A single warning's detail page
    Detail,
}

/// A single page to fetch
///
/// The role is fixed at construction; the driver dispatches responses on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    url: Url,
    role: PageRole,
}

impl CrawlRequest {
    /// A request for list page `page`
    pub fn list(page: u32, url: Url) -> Self {
        Self {
            url,
            role: PageRole::List { page },
        }
    }

    /// A request for a detail page found on a list page
    pub fn detail(link: DetailLink) -> Self {
        Self {
            url: link.into_url(),
            role: PageRole::Detail,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn role(&self) -> PageRole {
        self.role
    }
}

impl fmt::Display for CrawlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            PageRole::List { page } => write!(f, "list page {} ({})", page, self.url),
            PageRole::Detail => write!(f, "detail page {}", self.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request() {
        let url = Url::parse("https://www.fma.govt.nz/?start=11").unwrap();
        let request = CrawlRequest::list(2, url.clone());

        assert_eq!(request.url(), &url);
        assert_eq!(request.role(), PageRole::List { page: 2 });
        assert_eq!(
            request.to_string(),
            "list page 2 (https://www.fma.govt.nz/?start=11)"
        );
    }

    #[test]
    fn test_detail_request() {
        let url = Url::parse("https://www.fma.govt.nz/w/acme/").unwrap();
        let request = CrawlRequest::detail(DetailLink::new(url.clone()));

        assert_eq!(request.url(), &url);
        assert_eq!(request.role(), PageRole::Detail);
    }
}
