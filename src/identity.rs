use crate::names::normalize_names;

/// State name used by single-icon applets.
pub const SINGULAR_STATE: &str = "__SINGULAR__";

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InfoError {
    #[error("length of states must be greater than 0")]
    NoStates,
    #[error("length of states ({states}) must match length of icon_names ({icon_names})")]
    LengthMismatch { states: usize, icon_names: usize },
}

/// Everything that decides which icon an applet shows.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct IconIdentity {
    applet_name: Option<String>,
    uid: String,
    states: Vec<String>,
    icon_names: Vec<String>,
    // only present when some icon name had to be normalized
    icon_names_original: Option<Vec<String>>,
    current_state: Option<String>,
    current_size: u32,
}

impl IconIdentity {
    /// An identity with nothing set yet, displaying at `size`.
    pub fn new(size: u32) -> Self {
        Self {
            current_size: size,
            ..Default::default()
        }
    }

    /// Replace the applet name, instance id and state table.
    ///
    /// `states` and `icon_names` are parallel and must be non-empty and of equal length; if they
    /// aren't, nothing changes. Icon names are normalized with [`normalize_names`].
    ///
    /// Returns whether the applet name changed.
    pub fn set_info<S: AsRef<str>>(
        &mut self,
        applet_name: &str,
        uid: &str,
        states: &[S],
        icon_names: &[S],
    ) -> Result<bool, InfoError> {
        if states.is_empty() {
            return Err(InfoError::NoStates);
        }
        if states.len() != icon_names.len() {
            return Err(InfoError::LengthMismatch {
                states: states.len(),
                icon_names: icon_names.len(),
            });
        }

        let (icon_names, icon_names_original) = normalize_names(icon_names);
        self.states = states.iter().map(|s| s.as_ref().to_owned()).collect();
        self.icon_names = icon_names;
        self.icon_names_original = icon_names_original;
        self.uid = uid.to_owned();

        if self.applet_name.as_deref() == Some(applet_name) {
            return Ok(false);
        }

        self.applet_name = Some(applet_name.to_owned());
        Ok(true)
    }

    /// Drop the state table, keeping the applet name, uid, state and size.
    pub fn clear_info(&mut self) {
        self.states.clear();
        self.icon_names.clear();
        self.icon_names_original = None;
    }

    pub fn set_state(&mut self, state: &str) {
        self.current_state = Some(state.to_owned());
    }

    pub fn set_size(&mut self, size: u32) {
        self.current_size = size;
    }

    pub fn applet_name(&self) -> &str {
        self.applet_name.as_deref().unwrap_or_default()
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn icon_names(&self) -> &[String] {
        &self.icon_names
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    pub fn current_size(&self) -> u32 {
        self.current_size
    }

    /// Whether there is a state table, a state and a size to resolve with.
    ///
    /// A ready identity may still name a state that isn't in its table.
    pub fn is_ready(&self) -> bool {
        !self.states.is_empty() && self.current_state.is_some() && self.current_size > 0
    }

    /// Position of `state` in the state table.
    pub fn state_index(&self, state: &str) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }

    /// Position of the current state in the state table.
    pub fn current_index(&self) -> Option<usize> {
        self.state_index(self.current_state.as_deref()?)
    }

    /// The normalized icon name at `index`.
    pub fn icon_name(&self, index: usize) -> Option<&str> {
        self.icon_names.get(index).map(String::as_str)
    }

    /// The icon name at `index` as it was given, before normalization.
    ///
    /// This is what gets loaded as a file path.
    pub fn original_icon_name(&self, index: usize) -> Option<&str> {
        self.icon_names_original
            .as_ref()
            .and_then(|names| names.get(index))
            .or_else(|| self.icon_names.get(index))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod test {
    use crate::identity::{IconIdentity, InfoError};

    fn clock() -> IconIdentity {
        let mut identity = IconIdentity::new(48);
        identity
            .set_info(
                "clock",
                "42",
                &["running", "starting"],
                &["clock", "/opt/clock/starting.png"],
            )
            .unwrap();
        identity
    }

    #[test]
    fn test_set_info_normalizes_names() {
        let identity = clock();

        assert_eq!(identity.icon_names(), ["clock", "-opt-clock-starting.png"]);
        assert_eq!(identity.original_icon_name(0), Some("clock"));
        assert_eq!(identity.original_icon_name(1), Some("/opt/clock/starting.png"));
        assert_eq!(identity.icon_name(2), None);
    }

    #[test]
    fn test_original_falls_back_to_icon_name() {
        let mut identity = IconIdentity::new(48);
        identity
            .set_info("clock", "1", &["running"], &["clock"])
            .unwrap();

        assert_eq!(identity.original_icon_name(0), Some("clock"));
    }

    #[test]
    fn test_invalid_info_is_rejected() {
        let mut identity = clock();
        let before = identity.clone();

        let empty: [&str; 0] = [];
        assert_eq!(
            identity.set_info("other", "1", &empty, &empty),
            Err(InfoError::NoStates)
        );
        assert_eq!(
            identity.set_info("other", "1", &["a", "b"], &["a"]),
            Err(InfoError::LengthMismatch {
                states: 2,
                icon_names: 1
            })
        );
        assert_eq!(identity, before);
    }

    #[test]
    fn test_applet_change_is_reported_once() {
        let mut identity = clock();

        assert_eq!(identity.set_info("clock", "43", &["a"], &["b"]), Ok(false));
        assert_eq!(identity.uid(), "43");
        assert_eq!(identity.set_info("weather", "43", &["a"], &["b"]), Ok(true));
        assert_eq!(identity.applet_name(), "weather");
    }

    #[test]
    fn test_clear_info_keeps_the_rest() {
        let mut identity = clock();
        identity.set_state("running");
        identity.set_size(32);

        identity.clear_info();

        assert!(identity.states().is_empty());
        assert!(identity.icon_names().is_empty());
        assert!(!identity.is_ready());
        assert_eq!(identity.applet_name(), "clock");
        assert_eq!(identity.uid(), "42");
        assert_eq!(identity.current_state(), Some("running"));
        assert_eq!(identity.current_size(), 32);
    }

    #[test]
    fn test_current_index() {
        let mut identity = clock();
        assert_eq!(identity.current_index(), None);
        assert!(!identity.is_ready());

        identity.set_state("starting");
        assert_eq!(identity.current_index(), Some(1));
        assert!(identity.is_ready());

        identity.set_state("sleeping");
        assert_eq!(identity.current_index(), None);
        assert!(identity.is_ready());
    }
}
