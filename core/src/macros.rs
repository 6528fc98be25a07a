/// Builds a [`PropMap`](crate::value::PropMap) from `key => value` pairs.
///
/// Values go through `Into<Value>`, so primitives, strings, maps and nodes
/// all work directly.
///
/// # Example
///
/// ```rust
/// use inkui_core::props;
///
/// let style = props! {
///     "display" => "block",
///     "left" => 40,
/// };
/// assert_eq!(style.len(), 2);
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::value::PropMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::PropMap::new();
        $(map.set($key, $value);)+
        map
    }};
}
