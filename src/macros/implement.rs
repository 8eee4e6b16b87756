use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Error, ItemFn, Meta};

use crate::Result;

/// Wraps a free function into an `impl` block for the type named by the
/// attribute argument, i.e. `#[implement(Service)]` on `pub fn foo(&self)`
/// emits `impl Service { pub fn foo(&self) { .. } }`.
pub(super) fn implement(item: ItemFn, args: &[Meta]) -> Result<TokenStream> {
	let [Meta::Path(receiver)] = args else {
		return Err(Error::new(
			Span::call_site(),
			"expected the path of the receiver type as the only argument",
		));
	};

	let out = quote! {
		impl #receiver {
			#item
		}
	};

	Ok(out.into())
}
