//! The rich-text resolver facade and its builder.
//!
//! A [`RichTextResolver`] owns its collaborators and keeps no state between
//! calls, so one instance can serve any number of fragments. Concurrent use
//! needs one instance per thread, each with its own link resolver.
use std::fmt;

use log::{Level, Log, Record};

use super::process::{ProcessedFragment, process_fragment};
use crate::{
  error::{RichTextError, RichTextResult},
  types::{LinkResolver, ResolverOptions},
};

/// Resolves cross-reference links in rich-text fragments and cleans up the
/// authoring markup around them.
///
/// # Examples
///
/// ```
/// use richtext_resolver::{MapLinkResolver, ResolverOptions, RichTextResolver};
///
/// let resolver = RichTextResolver::builder()
///   .link_resolver(MapLinkResolver::new().with_link("tcm:1-2", "/page/a"))
///   .logger(log::logger())
///   .configuration(ResolverOptions::default())
///   .build()
///   .unwrap();
///
/// let html = resolver
///   .resolve(r#"<a xlink:href="tcm:1-2">text</a>"#, None)
///   .unwrap();
/// assert_eq!(html, r#"<a href="/page/a">text</a>"#);
/// ```
pub struct RichTextResolver {
  link_resolver: Box<dyn LinkResolver>,
  logger:        &'static dyn Log,
  options:       ResolverOptions,
}

impl RichTextResolver {
  /// Start building a resolver.
  #[must_use]
  pub fn builder() -> RichTextResolverBuilder {
    RichTextResolverBuilder::new()
  }

  /// Access the resolver options.
  #[must_use]
  pub const fn options(&self) -> &ResolverOptions {
    &self.options
  }

  /// Resolve the links in `fragment` and return the cleaned fragment.
  ///
  /// `page_id` is the page the fragment is rendered into; `None` resolves
  /// every link without page context.
  ///
  /// # Errors
  ///
  /// Returns [`RichTextError::MalformedFragment`] for fragments that are not
  /// well-formed and [`RichTextError::Resolver`] when the link resolver fails.
  pub fn resolve(
    &self,
    fragment: &str,
    page_id: Option<&str>,
  ) -> RichTextResult<String> {
    self.process(fragment, page_id).map(|processed| processed.html)
  }

  /// Like [`resolve`](Self::resolve), but also reports what each stage did.
  ///
  /// # Errors
  ///
  /// Same as [`resolve`](Self::resolve).
  pub fn process(
    &self,
    fragment: &str,
    page_id: Option<&str>,
  ) -> RichTextResult<ProcessedFragment> {
    let processed = process_fragment(
      fragment,
      page_id,
      self.link_resolver.as_ref(),
      &self.options,
    )?;

    self.trace(format_args!(
      "Resolved fragment ({} bytes, page {}): {} link(s) resolved, {} dead, \
       {} xlink attribute(s) scrubbed, {} source(s) adjusted, {} empty \
       anchor(s) normalized",
      fragment.len(),
      page_id.unwrap_or("none"),
      processed.links.resolved,
      processed.links.dead,
      processed.scrubbed_attributes,
      processed.adjusted_sources,
      processed.normalized_anchors,
    ));

    Ok(processed)
  }

  fn trace(&self, args: fmt::Arguments<'_>) {
    if Level::Trace > log::max_level() {
      return;
    }

    let record = Record::builder()
      .args(args)
      .level(Level::Trace)
      .target(module_path!())
      .module_path_static(Some(module_path!()))
      .file_static(Some(file!()))
      .line(Some(line!()))
      .build();
    if self.logger.enabled(record.metadata()) {
      self.logger.log(&record);
    }
  }
}

/// Builder for [`RichTextResolver`].
///
/// The link resolver, the logger and the configuration are all required;
/// [`build`](Self::build) refuses to produce a resolver without them.
#[derive(Default)]
pub struct RichTextResolverBuilder {
  link_resolver: Option<Box<dyn LinkResolver>>,
  logger:        Option<&'static dyn Log>,
  configuration: Option<ResolverOptions>,
}

impl RichTextResolverBuilder {
  /// Create a builder with no collaborators set.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the link resolver.
  #[must_use]
  pub fn link_resolver(
    mut self,
    link_resolver: impl LinkResolver + 'static,
  ) -> Self {
    self.link_resolver = Some(Box::new(link_resolver));
    self
  }

  /// Set the logger receiving trace diagnostics, usually [`log::logger`].
  #[must_use]
  pub fn logger(mut self, logger: &'static dyn Log) -> Self {
    self.logger = Some(logger);
    self
  }

  /// Set the resolver options.
  #[must_use]
  pub fn configuration(mut self, configuration: ResolverOptions) -> Self {
    self.configuration = Some(configuration);
    self
  }

  /// Build the resolver.
  ///
  /// # Errors
  ///
  /// Returns [`RichTextError::Configuration`] naming the first missing
  /// collaborator.
  pub fn build(self) -> RichTextResult<RichTextResolver> {
    let link_resolver = self
      .link_resolver
      .ok_or(RichTextError::Configuration("link_resolver"))?;
    let logger = self
      .logger
      .ok_or(RichTextError::Configuration("logger"))?;
    let options = self
      .configuration
      .ok_or(RichTextError::Configuration("configuration"))?;

    Ok(RichTextResolver {
      link_resolver,
      logger,
      options,
    })
  }
}

impl fmt::Debug for RichTextResolverBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RichTextResolverBuilder")
      .field("link_resolver", &self.link_resolver.is_some())
      .field("logger", &self.logger.is_some())
      .field("configuration", &self.configuration)
      .finish()
  }
}
