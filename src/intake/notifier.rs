/// Outbound channel from an intake to whoever owns it.
///
/// `set_uploaded` is required; the URL notifications are optional and
/// default to doing nothing.
pub trait IntakeNotifier {
    /// Acceptance status changed (or was recomputed)
    fn set_uploaded(&mut self, uploaded: bool);

    /// New single-file reference in `pdf` mode
    fn set_pdf_url(&mut self, _url: &str) {}

    /// URLs contributed by the latest accepted batch, or the full
    /// remaining list after a deletion
    fn set_in_out_urls(&mut self, _urls: &[String]) {}
}

impl<N: IntakeNotifier + ?Sized> IntakeNotifier for &mut N {
    fn set_uploaded(&mut self, uploaded: bool) {
        (**self).set_uploaded(uploaded)
    }

    fn set_pdf_url(&mut self, url: &str) {
        (**self).set_pdf_url(url)
    }

    fn set_in_out_urls(&mut self, urls: &[String]) {
        (**self).set_in_out_urls(urls)
    }
}

/// Notifier that keeps every call it receives, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    pub uploaded: Vec<bool>,
    pub pdf_urls: Vec<String>,
    pub in_out_urls: Vec<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent acceptance status, if any was sent
    pub fn last_uploaded(&self) -> Option<bool> {
        self.uploaded.last().copied()
    }

    pub fn last_in_out_urls(&self) -> Option<&[String]> {
        self.in_out_urls.last().map(|urls| urls.as_slice())
    }
}

impl IntakeNotifier for RecordingNotifier {
    fn set_uploaded(&mut self, uploaded: bool) {
        self.uploaded.push(uploaded);
    }

    fn set_pdf_url(&mut self, url: &str) {
        self.pdf_urls.push(url.to_string());
    }

    fn set_in_out_urls(&mut self, urls: &[String]) {
        self.in_out_urls.push(urls.to_vec());
    }
}
