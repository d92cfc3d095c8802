use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject dependencies.
///
/// Each test gets a fresh ledger backed by an in-memory store and a manual
/// clock stopped at `crate::test_epoch()`. Injectable dependencies are
/// [`rocket::local::asynchronous::Client`], `crate::model::clock::ManualClock`,
/// and `crate::model::store::MemoryStore`; the clock and store are shared with
/// the running server, so tests can move time or inspect what was committed.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        let args = TokenStream2::from(args);
        return syn::Error::new(args.span(), "`backend_test` takes no arguments")
            .into_compile_error()
            .into();
    }

    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the injected arguments and reject invalid function signatures.
    let test_args = match check_sig(&item_fn.sig) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    quote! {
        #[test]
        #[allow(unused_variables)]
        fn #name() {
            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(
                vec!["election_ledger"],
                None,
                None,
            );

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let store = crate::model::store::MemoryStore::new();
                let clock = crate::model::clock::ManualClock::new(crate::test_epoch());
                let rocket = crate::rocket_for_store(
                    std::sync::Arc::new(store.clone()),
                    std::sync::Arc::new(clock.clone()),
                );
                let client = rocket::local::asynchronous::Client::tracked(rocket)
                    .await
                    .unwrap();

                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async and map each parameter to the value to inject.
fn check_sig(sig: &Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut args = vec![];
    let mut seen = vec![];

    for input in &sig.inputs {
        let injected = match input {
            FnArg::Typed(pat_type) => match (&*pat_type.pat, &*pat_type.ty) {
                (Pat::Ident(_), Type::Path(type_path)) => type_path
                    .path
                    .segments
                    .last()
                    .and_then(|segment| match segment.ident.to_string().as_str() {
                        "Client" => Some("client"),
                        "ManualClock" => Some("clock"),
                        "MemoryStore" => Some("store"),
                        _ => None,
                    }),
                _ => None,
            },
            FnArg::Receiver(_) => None,
        };

        let Some(injected) = injected else {
            return Err(syn::Error::new(
                input.span(),
                "Expected one of `client_ident: Client`, `clock_ident: ManualClock` or `store_ident: MemoryStore`",
            ));
        };
        if seen.contains(&injected) {
            return Err(syn::Error::new(
                input.span(),
                format!("Test cannot accept more than one `{injected}`"),
            ));
        }
        seen.push(injected);

        let ident = format_ident!("{}", injected);
        args.push(quote! { #ident });
    }

    Ok(args)
}
