pub(crate) mod guest;
