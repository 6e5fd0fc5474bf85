use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use quote::quote_spanned;
use std::path::Path;

/// Run the test against the stub server serving the collections of a JSON fixture.
///
/// `#[collections_test("fixtures/db.json")]` or
/// `#[collections_test("fixtures/db.json", configure)]`, where `configure` is a
/// `fn(&mut stub_server::StubConfiguration)`. The fixture path is relative to the
/// crate's manifest directory.
#[proc_macro_attribute]
pub fn collections_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    if args.is_empty() || args.len() > 2 {
        return quote! {
            compile_error!("A fixture path and an optional configuration function should be passed to the macro");
        }
        .into();
    }

    let fixture_path = match &args[0] {
        syn::NestedMeta::Lit(syn::Lit::Str(parsed_fixture_path)) => {
            let fixture_path = parsed_fixture_path.value();
            if let Err(stream) = validate_fixture_path(&fixture_path, parsed_fixture_path.span()) {
                return stream.into();
            }
            fixture_path
        }
        _ => {
            return quote! {
                compile_error!("The first argument should be a string literal!");
            }
            .into()
        }
    };

    let configure_with = match args.get(1) {
        None => None,
        Some(meta) => match configuration_function(meta) {
            Ok(function_path) => Some(function_path),
            Err(stream) => return stream.into(),
        },
    };

    let setup = quote! {
        __stub_configuration.set_fixture_file(
            concat!(env!("CARGO_MANIFEST_DIR"), "/", #fixture_path)
        );
    };

    stub_test(
        input,
        quote! { stub_server::StubMode::Collections },
        setup,
        configure_with,
    )
}

/// Run the test against the stub server replaying scripted responses.
///
/// `#[scripted_test(configure)]`, where `configure` is a
/// `fn(&mut stub_server::StubConfiguration)` queueing the responses.
#[proc_macro_attribute]
pub fn scripted_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    if args.len() != 1 {
        return quote! {
            compile_error!("A configuration function should be passed to the macro");
        }
        .into();
    }

    let function_path = match configuration_function(&args[0]) {
        Ok(function_path) => function_path,
        Err(stream) => return stream.into(),
    };

    stub_test(
        input,
        quote! { stub_server::StubMode::Scripted },
        quote! {},
        Some(function_path),
    )
}

fn configuration_function(
    meta: &syn::NestedMeta,
) -> Result<&syn::Path, proc_macro2::TokenStream> {
    if let syn::NestedMeta::Meta(syn::Meta::Path(function_path)) = meta {
        Ok(function_path)
    } else {
        Err(quote! {
            compile_error!("Expected a configuration function!");
        })
    }
}

fn stub_test(
    input: syn::ItemFn,
    mode_variant: proc_macro2::TokenStream,
    setup: proc_macro2::TokenStream,
    configuration_function: Option<&syn::Path>,
) -> TokenStream {
    let attributes = &input.attrs;
    let signature = &input.sig;
    let block = &input.block;

    let configure = configuration_function.map(|function_path| {
        quote! { #function_path(&mut __stub_configuration); }
    });

    let output = quote! {
        #[test]
        #(#attributes)*
        #signature {
            let mut __stub_configuration = stub_server::StubConfiguration::new(#mode_variant);
            #setup
            #configure

            if let Err(e) = stub_server::TestSession::before_test(__stub_configuration) {
                panic!("Stub server error: {}", e);
            }

            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                #block
            })) {
                let _ = stub_server::TestSession::after_test();
                std::panic::resume_unwind(e);
            }
            if let Err(e) = stub_server::TestSession::after_test() {
                panic!("Stub server error: {}", e);
            }
        }
    };

    TokenStream::from(output)
}

fn validate_fixture_path<P: AsRef<Path>>(
    path: P,
    span: Span,
) -> Result<(), proc_macro2::TokenStream> {
    if !path.as_ref().to_string_lossy().ends_with(".json") {
        return Err(quote_spanned! {span=>
            compile_error!("The path should point to a .json file!");
        });
    }

    Ok(())
}
