/// A value that knows which schema version it is in.
///
/// The usual implementor is an enum with one variant per supported schema
/// version, each wrapping the generated struct for that version:
///
/// ```
/// use verchain::Versioned;
///
/// struct UserV1 { name: String }
/// struct UserV2 { name: String, email: Option<String> }
///
/// enum User {
///     V1(UserV1),
///     V2(UserV2),
/// }
///
/// impl Versioned for User {
///     type Latest = UserV2;
///
///     fn version(&self) -> u16 {
///         match self {
///             User::V1(_) => 1,
///             User::V2(_) => 2,
///         }
///     }
///
///     fn from_latest(latest: UserV2, _latest_version: u16) -> Self {
///         User::V2(latest)
///     }
///
///     fn into_latest(self) -> Result<UserV2, Self> {
///         match self {
///             User::V2(user) => Ok(user),
///             other => Err(other),
///         }
///     }
/// }
/// ```
///
/// Chains whose version set is only known at runtime can use
/// [`ErasedValue`](crate::ErasedValue) instead.
pub trait Versioned: Sized {
    /// The representation application code works with.
    type Latest;

    /// Schema version of this value.
    fn version(&self) -> u16;

    /// Wrap a latest-version value. `latest_version` is the handler's latest
    /// version, for implementors that cannot derive it from the type.
    fn from_latest(latest: Self::Latest, latest_version: u16) -> Self;

    /// Unwrap the latest-version value, handing `self` back if it is older.
    fn into_latest(self) -> Result<Self::Latest, Self>;
}
