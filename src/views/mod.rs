//! 서버 사이드 렌더링 뷰
//!
//! Each page is a fixed body fragment compiled into the binary and
//! wrapped in the shared layout at request time. The only per-request
//! data is the page title carried by [`PageView`].

/// View model passed to the layout, built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub title: String,
}

impl PageView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Pages the server renders and their fixed routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Posts,
    Signup,
    Service,
    Privacy,
}

impl Page {
    /// Resolve a request path to a rendered page, if one is mounted there.
    /// A lone trailing slash is ignored, so `/login/` renders the login page.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path
            .strip_suffix('/')
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(path);
        match path {
            "/login" => Some(Self::Login),
            "/posts" => Some(Self::Posts),
            "/signup" => Some(Self::Signup),
            "/service" => Some(Self::Service),
            "/privacy" => Some(Self::Privacy),
            _ => None,
        }
    }

    /// Title shown in the browser tab and the page heading.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "로그인 페이지",
            Self::Posts => "게시판",
            Self::Signup => "회원가입 페이지",
            Self::Service => "서비스 이용약관",
            Self::Privacy => "개인정보처리방침",
        }
    }

    const fn body(self) -> &'static str {
        match self {
            Self::Login => include_str!("pages/login.html"),
            Self::Posts => include_str!("pages/posts.html"),
            Self::Signup => include_str!("pages/signup.html"),
            Self::Service => include_str!("pages/service.html"),
            Self::Privacy => include_str!("pages/privacy.html"),
        }
    }
}

/// Render a page to a full HTML document.
pub fn render(page: Page) -> String {
    let view = PageView::new(page.title());
    render_layout(&view, page.body())
}

fn render_layout(view: &PageView, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <link rel="stylesheet" href="/css/style.css">
</head>
<body>
  <header class="site-header">
    <a class="brand" href="/posts">커뮤니티</a>
    <nav class="site-nav">
      <a href="/posts">게시판</a>
      <a href="/login">로그인</a>
      <a href="/signup">회원가입</a>
    </nav>
  </header>
  <main class="content">
    <h1>{title}</h1>
{body}  </main>
  <footer class="site-footer">
    <a href="/service">서비스 이용약관</a>
    <a href="/privacy">개인정보처리방침</a>
  </footer>
</body>
</html>
"#,
        title = view.title,
        body = body,
    )
}
