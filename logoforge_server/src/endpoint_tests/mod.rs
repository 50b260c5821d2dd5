mod helpers;
mod oauth;
mod pages;
mod webhooks;
