/// Catalog shipped with the library, used when no catalog file is configured
pub const BUILTIN_CATALOG: &str = r##"{
  "platforms": ["ubuntu", "debian", "linuxmint", "pop", "arch", "manjaro", "fedora", "opensuse"],
  "package_managers": {
    "apt": "sudo apt install {package}",
    "pacman": "sudo pacman -S {package}",
    "flatpak": "flatpak install flathub {package}",
    "dnf": "sudo dnf install {package}",
    "zypper": "sudo zypper install {package}"
  },
  "dependencies": {
    "wine": {
      "description": "Windows application compatibility layer",
      "required": true,
      "commands": {
        "ubuntu": "sudo apt install wine",
        "debian": "sudo apt install wine",
        "linuxmint": "sudo apt install wine",
        "pop": "sudo apt install wine",
        "arch": "sudo pacman -S wine",
        "manjaro": "sudo pacman -S wine",
        "fedora": "sudo dnf install wine",
        "opensuse": "sudo zypper install wine",
        "unknown": "# Install wine with your distribution's package manager"
      },
      "benefits": [
        "Essential for running Windows applications",
        "Mature and stable"
      ]
    },
    "lutris": {
      "description": "Open gaming platform with community-maintained game installers",
      "commands": {
        "ubuntu": "sudo apt install lutris",
        "debian": "sudo apt install lutris",
        "linuxmint": "sudo apt install lutris",
        "pop": "sudo apt install lutris",
        "arch": "sudo pacman -S lutris",
        "manjaro": "sudo pacman -S lutris",
        "unknown": "flatpak install flathub net.lutris.Lutris"
      },
      "benefits": [
        "Community-optimized configurations for thousands of games",
        "Automatic dependency management",
        "Per-game performance tweaks",
        "Unified library for all your games"
      ]
    },
    "winetricks": {
      "description": "Helper for installing Windows runtime libraries into Wine prefixes",
      "commands": {
        "ubuntu": "sudo apt install winetricks",
        "debian": "sudo apt install winetricks",
        "linuxmint": "sudo apt install winetricks",
        "pop": "sudo apt install winetricks",
        "arch": "sudo pacman -S winetricks",
        "manjaro": "sudo pacman -S winetricks",
        "fedora": "sudo dnf install winetricks",
        "opensuse": "sudo zypper install winetricks",
        "unknown": "# Install winetricks with your distribution's package manager"
      },
      "benefits": [
        "Installs Visual C++ runtimes, .NET and fonts",
        "Fixes many application startup errors"
      ]
    },
    "dxvk": {
      "description": "Vulkan-based translation layer for Direct3D 9/10/11",
      "binary": "setup_dxvk",
      "commands": {
        "ubuntu": "sudo apt install dxvk",
        "debian": "sudo apt install dxvk",
        "linuxmint": "sudo apt install dxvk",
        "pop": "sudo apt install dxvk",
        "unknown": "# Install DXVK into your Wine prefix with winetricks dxvk"
      },
      "benefits": [
        "Much higher frame rates in Direct3D games",
        "Fewer rendering glitches than Wine's OpenGL backend"
      ]
    },
    "gamemode": {
      "description": "Daemon that applies performance optimisations while a game runs",
      "binary": "gamemoded",
      "commands": {
        "ubuntu": "sudo apt install gamemode",
        "debian": "sudo apt install gamemode",
        "linuxmint": "sudo apt install gamemode",
        "pop": "sudo apt install gamemode",
        "arch": "sudo pacman -S gamemode",
        "manjaro": "sudo pacman -S gamemode",
        "fedora": "sudo dnf install gamemode",
        "unknown": "# Install gamemode with your distribution's package manager"
      },
      "benefits": [
        "CPU governor switched to performance mode",
        "Higher scheduling priority for the game process"
      ]
    }
  },
  "programs": {
    "photoshop": {
      "name": "Adobe Photoshop",
      "executables": ["Photoshop.exe"],
      "alternatives": {
        "recommended": {
          "name": "GIMP",
          "packages": { "flatpak": "org.gimp.GIMP", "apt": "gimp", "pacman": "gimp", "dnf": "gimp" },
          "summary": "Full-featured raster image editor",
          "caveat": "PSD files with adjustment layers may not import exactly",
          "info_url": "https://alternativeto.net/software/adobe-photoshop/?platform=linux"
        }
      },
      "warnings": ["drm"]
    },
    "notepad_plus_plus": {
      "name": "Notepad++",
      "executables": ["notepad++.exe", "npp.exe"],
      "alternatives": {
        "recommended": {
          "name": "Kate",
          "packages": { "apt": "kate", "pacman": "kate", "dnf": "kate", "flatpak": "org.kde.kate" },
          "summary": "Programmer's text editor with syntax highlighting and plugins",
          "info_url": "https://alternativeto.net/software/notepad-plus-plus/?platform=linux"
        }
      }
    },
    "ms_office": {
      "name": "Microsoft Office",
      "executables": ["WINWORD.EXE", "EXCEL.EXE", "POWERPNT.EXE"],
      "alternatives": {
        "recommended": {
          "name": "LibreOffice",
          "packages": { "apt": "libreoffice", "pacman": "libreoffice-fresh", "dnf": "libreoffice", "flatpak": "org.libreoffice.LibreOffice" },
          "summary": "Office suite that opens and saves Microsoft Office formats",
          "caveat": "Complex macros and some layouts may differ from Office",
          "info_url": "https://alternativeto.net/software/microsoft-office/?platform=linux"
        }
      },
      "warnings": ["drm"]
    },
    "steam": {
      "name": "Steam",
      "executables": ["SteamSetup.exe", "steam.exe"],
      "alternatives": {
        "recommended": {
          "name": "Steam (native)",
          "packages": { "apt": "steam", "pacman": "steam", "flatpak": "com.valvesoftware.Steam" },
          "summary": "Native Steam client with Proton for Windows games"
        }
      },
      "warnings": ["launcher"]
    },
    "epic_games_launcher": {
      "name": "Epic Games Launcher",
      "executables": ["EpicInstaller.exe", "EpicGamesLauncher.exe"],
      "warnings": ["launcher", "anticheat"]
    }
  },
  "messages": {
    "drm": {
      "message": "{game_name} uses DRM or online activation that may not work under Wine.",
      "instructions": [
        "Activate the program while online before going offline",
        "Check the program's ProtonDB or WineHQ AppDB page for known workarounds",
        "Keep a backup of the Wine prefix once activation succeeds"
      ]
    },
    "anticheat": {
      "message": "{game_name} ships with anti-cheat software that often blocks Wine and Proton.",
      "instructions": [
        "Check areweanticheatyet.com for the current status of each game",
        "Online multiplayer may be unavailable even if the launcher starts"
      ]
    },
    "launcher": {
      "message": "{game_name} is a game launcher; games are installed through it rather than directly.",
      "instructions": [
        "Consider a native launcher or Lutris installer script instead",
        "Install games into the same Wine prefix as the launcher"
      ]
    }
  }
}"##;
