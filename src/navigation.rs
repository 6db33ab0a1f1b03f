//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::{auth::Role, endpoints};

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm md:bg-transparent
        md:text-blue-700 md:p-0 dark:text-white md:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        md:hover:bg-transparent md:border-0 md:hover:text-blue-700 md:p-0
        dark:text-white md:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white md:dark:hover:bg-transparent"
        };

        html!( a href=(self.url) class=(style) aria-current=[self.is_current.then_some("page")] { (self.title) } )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    role: Role,
}

impl NavBar<'_> {
    /// Get the navigation bar for a user with `role`.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str, role: Role) -> NavBar<'_> {
        let pages: &[(&str, &str)] = match role {
            Role::Employee => &[
                (endpoints::EMPLOYEE_DASHBOARD_VIEW, "Dashboard"),
                (endpoints::NEW_TRANSACTION_VIEW, "Enter Data"),
                (endpoints::IMPORT_VIEW, "Upload CSV"),
            ],
            Role::Owner => &[
                (endpoints::OWNER_DASHBOARD_VIEW, "Dashboard"),
                (endpoints::NEW_EMPLOYEE_VIEW, "Add Employee"),
            ],
        };

        let mut links = pages
            .iter()
            .map(|&(url, title)| Link {
                url,
                title,
                is_current: active_endpoint == url,
            })
            .collect::<Vec<_>>();

        links.push(Link {
            url: endpoints::LOG_OUT,
            title: "Log out",
            is_current: false,
        });

        NavBar { links, role }
    }

    pub fn into_html(self) -> Markup {
        let role_label = match self.role {
            Role::Employee => "Employee",
            Role::Owner => "Owner",
        };

        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href="/"
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        img
                            src="/static/favicon-32x32.png"
                            alt="G-Audit Logo"
                            class="h-8"
                        ;

                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "G-Audit"
                        }

                        span
                            class="text-xs font-medium px-2 py-0.5 rounded bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300"
                        {
                            (role_label)
                        }
                    }

                    div class="w-full md:block md:w-auto" id="navbar-default"
                    {
                        ul
                            class="font-medium flex flex-col p-4 md:p-0 mt-4 border
                            border-gray-100 rounded-lg bg-gray-50 md:flex-row
                            md:space-x-8 rtl:space-x-reverse md:mt-0 md:border-0
                            md:bg-white dark:bg-gray-800 md:dark:bg-gray-900
                            dark:border-gray-700"
                        {
                            @for link in self.links {
                                li { (link.into_html()) }
                            }
                        }
                    }
                }
            }
        )
    }
}
