use std::collections::HashMap;
use std::error::Error;
use std::net::SocketAddr;

use dotenv::dotenv;
use log::{debug, error, info, initialize_logger};
use oauth2::reqwest::async_http_client;
use oauth2::{AuthorizationCode, CsrfToken, RedirectUrl, Scope, TokenResponse};
use structopt::StructOpt;
use tokio::sync::mpsc;
use warp::http::StatusCode;
use warp::Filter;

use uploader::google::{oauth_client, SCOPES};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "get-refresh-token",
    about = "Run the OAuth consent flow once and print a refresh token for the uploader"
)]
struct Opt {
    /// The OAuth client ID
    #[structopt(long, env = "GOOGLE_CLIENT_ID")]
    client_id: String,

    /// The OAuth client secret
    #[structopt(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// The local address to receive the consent callback on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let redirect = format!("http://localhost:{}/oauth2callback", opt.listen.port());
    let client = oauth_client(opt.client_id, opt.client_secret)?
        .set_redirect_uri(RedirectUrl::new(redirect.clone())?);

    let (auth_url, _csrf) = SCOPES
        .iter()
        .fold(client.authorize_url(CsrfToken::new_random), |request, scope| {
            request.add_scope(Scope::new((*scope).to_owned()))
        })
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .url();

    info!(logger, "Open this URL to grant access"; "url" => %auth_url, "redirect" => &redirect);
    println!("{}", auth_url);

    let (code_sender, mut code_receiver) = mpsc::channel::<String>(1);

    let callback = warp::path("oauth2callback")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and_then(move |query: HashMap<String, String>| {
            let code_sender = code_sender.clone();

            async move {
                let reply = match query.get("code") {
                    Some(code) => {
                        code_sender.send(code.clone()).await.ok();
                        warp::reply::with_status(
                            "Auth complete. Check your terminal for the refresh token.\n",
                            StatusCode::OK,
                        )
                    }
                    None => warp::reply::with_status("Missing code", StatusCode::BAD_REQUEST),
                };

                Ok::<_, std::convert::Infallible>(reply)
            }
        });
    let waiting = warp::any().map(|| "Waiting for OAuth callback...");

    let (code_for_server, mut code_seen) = mpsc::channel::<()>(1);
    let (_, server) = warp::serve(callback.or(waiting)).bind_with_graceful_shutdown(
        opt.listen,
        async move {
            code_seen.recv().await;
        },
    );
    let server = tokio::spawn(server);

    let code = code_receiver
        .recv()
        .await
        .ok_or("callback server stopped before receiving a code")?;
    code_for_server.send(()).await.ok();
    debug!(logger, "Received authorization code");

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(async_http_client)
        .await?;

    server.await?;

    match token.refresh_token() {
        Some(refresh_token) => {
            info!(logger, "Store this as GOOGLE_REFRESH_TOKEN");
            println!("{}", refresh_token.secret());
            Ok(())
        }
        None => {
            error!(logger, "No refresh token returned; revoke the app's access and try again");
            Err("no refresh token returned".into())
        }
    }
}
